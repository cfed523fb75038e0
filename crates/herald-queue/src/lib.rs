//! Queue transport for Herald.
//!
//! The pipeline only needs a durable FIFO list with four operations:
//! blocking pop with a timeout, push, length and a liveness probe. Those
//! are expressed by [`QueueTransport`]; [`RedisQueue`] implements it with
//! `LPUSH`/`BRPOP` and [`MemoryQueue`] keeps everything in-process.
//!
//! ```text
//! producer --LPUSH--> [ tweet_queue ] --BRPOP--> courier
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod memory;
pub mod redis_queue;
pub mod transport;

pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use health::QueueHealth;
pub use memory::MemoryQueue;
pub use redis_queue::RedisQueue;
pub use transport::{QueueHandle, QueueItem, QueueTransport};
