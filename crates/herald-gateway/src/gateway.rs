//! The posting capability.

use crate::error::{GatewayError, GatewayResult};
use crate::outcome::{GatewayStatus, Identity, PostOutcome, PostSummary};
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can publish text on behalf of an account.
#[async_trait]
pub trait PostingGateway: Send + Sync {
    /// Publish `text` once. No truncation or retry happens here.
    async fn post(&self, text: &str) -> PostOutcome;

    /// The account posts are published as.
    async fn identity(&self) -> GatewayResult<Identity>;

    /// Recent posts matching `query`, at most `max_results`.
    async fn search(&self, query: &str, max_results: u32) -> GatewayResult<Vec<PostSummary>>;

    /// Coarse health, derived from an identity lookup by default.
    async fn status(&self) -> GatewayStatus {
        match self.identity().await {
            Ok(_) => GatewayStatus::Ok,
            Err(GatewayError::RateLimited { .. }) => GatewayStatus::RateLimited,
            Err(e) => GatewayStatus::Error(e.to_string()),
        }
    }
}

/// Shared handle to a posting gateway.
pub type GatewayHandle = Arc<dyn PostingGateway>;
