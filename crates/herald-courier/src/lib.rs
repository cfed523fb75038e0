//! Herald courier: moves events from the queue to the posting gateway.
//!
//! One sequential loop per process. Each iteration pops a single item,
//! decodes it, drops it if it belongs to another profile, validates and
//! renders it, then posts the text through the gateway's posting policy.
//!
//! # Failure handling
//!
//! 1. **Malformed payloads and foreign kinds** are discarded and not counted
//! 2. **Invalid events and failed posts** count toward the consecutive-failure
//!    bound; reaching it triggers a cooldown
//! 3. **Queue connection loss** is retried forever with a fixed backoff
//! 4. **No acknowledgement**: a popped item that is not finished before a
//!    crash is lost
//!
//! # Architecture
//!
//! ```text
//! Queue --pop--> Courier --render--> PostingPolicy --post--> Gateway
//! ```

pub mod config;
pub mod courier;
pub mod error;
pub mod shutdown;
pub mod state;
pub mod status;

#[cfg(test)]
mod tests;

pub use config::{ConsumerProfile, CourierConfig};
pub use courier::{Courier, IterationOutcome};
pub use error::{CourierError, CourierResult};
pub use shutdown::{shutdown_signal, Shutdown, ShutdownTrigger};
pub use state::{ConsumerState, CourierStats};
pub use status::StatusSnapshot;
