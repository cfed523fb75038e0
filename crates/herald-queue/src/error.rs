//! Error types for the queue transport.

use thiserror::Error;

/// Queue error type.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Transport is unreachable
    #[error("Queue connection error: {0}")]
    Connection(String),

    /// Unexpected reply shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueueError {
    /// Whether this is a transport-level failure that a reconnect may fix.
    pub fn is_connection_error(&self) -> bool {
        match self {
            QueueError::Redis(e) => {
                e.is_io_error()
                    || e.is_connection_dropped()
                    || e.is_connection_refusal()
                    || e.is_timeout()
            }
            QueueError::Connection(_) => true,
            QueueError::Protocol(_) | QueueError::Config(_) => false,
        }
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
