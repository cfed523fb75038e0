//! The queue capability the pipeline depends on.

use crate::error::QueueResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// An item popped from a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Name of the list the item came from.
    pub source_queue: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

/// Durable FIFO list.
///
/// Producers push to the head, consumers pop from the tail. The pop is the
/// only coordination primitive between consumers sharing a queue: each
/// item is handed to exactly one caller and is gone from the queue once
/// returned.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Pop from the tail, waiting at most `timeout`. `None` on timeout.
    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> QueueResult<Option<QueueItem>>;

    /// Pop from the tail without waiting.
    async fn pop_now(&self, queue: &str) -> QueueResult<Option<QueueItem>>;

    /// Push to the head. Returns the new length.
    async fn push(&self, queue: &str, payload: &[u8]) -> QueueResult<u64>;

    /// Number of items waiting.
    async fn length(&self, queue: &str) -> QueueResult<u64>;

    /// Liveness probe.
    async fn ping(&self) -> QueueResult<()>;

    /// Re-establish the connection and probe it.
    async fn reconnect(&self) -> QueueResult<()> {
        self.ping().await
    }
}

/// Shared handle to a queue transport.
pub type QueueHandle = Arc<dyn QueueTransport>;
