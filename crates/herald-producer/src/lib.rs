//! Herald producer: synthesizes events and pushes them onto the queue.
//!
//! Publishing stamps every event with a `queue_timestamp` and a
//! `queue_id` so a post can be traced back to the push that created it.
//! Failures are returned to the caller; nothing here retries.

pub mod config;
pub mod error;
pub mod generator;
pub mod producer;

pub use config::ProducerConfig;
pub use error::{ProducerError, ProducerResult};
pub use generator::{parse_kind, EventGenerator, SYNTHESIZABLE};
pub use producer::{Producer, PublishReceipt, QueueStatus};
