//! Error types for the posting gateway.

use std::time::Duration;
use thiserror::Error;

/// Errors from gateway lookups and client construction.
///
/// Posting itself never fails with this type; it reports a
/// [`PostOutcome`](crate::PostOutcome) instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API asked us to slow down
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// No access token configured
    #[error("Missing access token (set TWITTER_ACCESS_TOKEN or use dry-run)")]
    MissingCredentials,

    /// Invalid response from API (missing expected fields)
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Whether the destination refused our credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingCredentials | GatewayError::Api { status: 401, .. }
        )
    }
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
