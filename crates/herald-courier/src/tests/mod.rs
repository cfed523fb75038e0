//! Behavior tests for the courier.
//!
//! - `harness.rs`          - Mock queue, mock gateway and a wired courier
//! - `pipeline.rs`         - Pop, parse, validate, render, post
//! - `routing.rs`          - Profile filtering and malformed payloads
//! - `degradation.rs`      - Consecutive failures and cooldown
//! - `rate_limit.rs`       - Rate-limit waits and the retry cap
//! - `transport_failure.rs` - Reconnect behavior when the queue drops
//! - `shutdown.rs`         - Cooperative shutdown
//! - `status.rs`           - Status snapshot and single-item mode

pub(crate) mod harness;
mod routing;
