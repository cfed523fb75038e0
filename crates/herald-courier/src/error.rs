//! Error types for the courier.

use thiserror::Error;

/// Courier error type.
#[derive(Error, Debug)]
pub enum CourierError {
    /// Queue transport error
    #[error("Queue error: {0}")]
    Queue(#[from] herald_queue::QueueError),

    /// Posting gateway error (startup checks and status lookups)
    #[error("Gateway error: {0}")]
    Gateway(#[from] herald_gateway::GatewayError),

    /// Template loading error
    #[error("Content error: {0}")]
    Content(#[from] herald_content::ContentError),

    /// Status output could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CourierError {
    /// Whether a queue reconnect may clear this error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CourierError::Queue(e) if e.is_connection_error())
    }
}

/// Result type for courier operations.
pub type CourierResult<T> = Result<T, CourierError>;
