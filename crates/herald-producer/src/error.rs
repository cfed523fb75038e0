//! Error types for the producer.

use thiserror::Error;

/// Producer error type.
#[derive(Error, Debug)]
pub enum ProducerError {
    /// Queue transport error
    #[error("Queue error: {0}")]
    Queue(#[from] herald_queue::QueueError),

    /// Event could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or argument error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for producer operations.
pub type ProducerResult<T> = Result<T, ProducerError>;
