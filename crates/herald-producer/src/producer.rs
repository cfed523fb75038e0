//! Publishing events onto the queue.

use crate::config::ProducerConfig;
use crate::error::ProducerResult;
use crate::generator::{unix_seconds, EventGenerator};
use chrono::{DateTime, Utc};
use herald_content::{Event, EventKind};
use herald_queue::{QueueHandle, QueueHealth};
use serde::Serialize;
use tracing::{info, warn};

/// Characters of content included in log lines.
const PREVIEW_CHARS: usize = 100;

/// Where a published event ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    pub queue_id: String,
    /// Queue length right after the push
    pub queue_length: u64,
}

/// Queue status as reported by `herald-producer status`.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub queue_name: String,
    #[serde(flatten)]
    pub health: QueueHealth,
    pub timestamp: DateTime<Utc>,
}

impl QueueStatus {
    /// Status for a queue that could not be reached at all.
    pub fn unreachable(queue_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            health: QueueHealth::Error {
                reason: reason.into(),
            },
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "queue {}: {}", self.queue_name, self.health.label())?;
        match &self.health {
            QueueHealth::Healthy { length } | QueueHealth::Warning { length } => {
                write!(f, " (length {})", length)
            }
            QueueHealth::Error { reason } => write!(f, " ({})", reason),
        }
    }
}

/// Pushes events onto the configured queue.
pub struct Producer {
    queue: QueueHandle,
    config: ProducerConfig,
    generator: EventGenerator,
}

impl Producer {
    pub fn new(queue: QueueHandle, config: ProducerConfig) -> Self {
        Self::with_generator(queue, config, EventGenerator::new())
    }

    pub fn with_generator(queue: QueueHandle, config: ProducerConfig, generator: EventGenerator) -> Self {
        Self {
            queue,
            config,
            generator,
        }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Generate an event without publishing it.
    pub fn generate(&mut self, kind: Option<EventKind>) -> Event {
        self.generator.generate(kind)
    }

    /// Stamp, serialize and push one event.
    ///
    /// Any existing `queue_timestamp` / `queue_id` is overwritten. Errors are
    /// returned as-is; nothing is retried.
    pub async fn publish(&mut self, mut event: Event) -> ProducerResult<PublishReceipt> {
        let queue_timestamp = unix_seconds();
        let queue_id = format!(
            "msg_{}_{}",
            (queue_timestamp * 1000.0) as u64,
            self.generator.suffix()
        );
        event.queue_timestamp = Some(queue_timestamp);
        event.queue_id = Some(queue_id.clone());

        let queue_name = &self.config.queue.queue_name;
        let payload = event.to_json()?;

        match self.queue.push(queue_name, payload.as_bytes()).await {
            Ok(queue_length) => {
                info!(
                    queue = %queue_name,
                    queue_id = %queue_id,
                    kind = %event.kind(),
                    queue_length,
                    preview = %event.preview(PREVIEW_CHARS),
                    "Event published"
                );
                Ok(PublishReceipt {
                    queue_id,
                    queue_length,
                })
            }
            Err(e) => {
                warn!(
                    queue = %queue_name,
                    queue_id = %queue_id,
                    kind = %event.kind(),
                    error = %e,
                    "Failed to publish event"
                );
                Err(e.into())
            }
        }
    }

    /// Publish `count` generated events, pausing between sends.
    ///
    /// Failures are logged and skipped. Returns how many were published.
    pub async fn batch_publish(&mut self, count: usize, kind: Option<EventKind>) -> usize {
        info!(count, kind = ?kind, "Starting batch publish");
        let mut published = 0;

        for i in 0..count {
            let event = self.generator.generate(kind);
            if self.publish(event).await.is_ok() {
                published += 1;
            }
            if i + 1 < count {
                tokio::time::sleep(self.config.batch_pacing).await;
            }
        }

        info!(published, failed = count - published, "Batch publish finished");
        published
    }

    /// Queue length and health.
    pub async fn queue_status(&self) -> QueueStatus {
        let queue_name = self.config.queue.queue_name.clone();
        let health = QueueHealth::probe(
            self.queue.as_ref(),
            &queue_name,
            self.config.warning_threshold,
        )
        .await;

        QueueStatus {
            queue_name,
            health,
            timestamp: Utc::now(),
        }
    }
}
