//! Posting gateway for Herald.
//!
//! [`PostingGateway`] is the capability the consumer needs from the social
//! platform: publish a piece of text and report what happened. The
//! [`PostingPolicy`] wraps it with length truncation and the rate-limit
//! retry loop. Two implementations ship with the crate:
//!
//! - [`XClient`] talks to the X API v2 with a user-context bearer token.
//! - [`DryRunGateway`] logs the would-be post and reports a synthetic success.

pub mod config;
pub mod dry_run;
pub mod error;
pub mod gateway;
pub mod outcome;
pub mod policy;
pub mod x_client;

pub use config::GatewayConfig;
pub use dry_run::DryRunGateway;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{GatewayHandle, PostingGateway};
pub use outcome::{GatewayStatus, Identity, PostOutcome, PostSummary, PublishedPost};
pub use policy::{Delivery, PostingPolicy};
pub use x_client::XClient;
