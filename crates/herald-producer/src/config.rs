//! Producer configuration.

use herald_queue::health::DEFAULT_WARNING_THRESHOLD;
use herald_queue::QueueConfig;
use std::time::Duration;

/// Producer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Queue connection and list name
    pub queue: QueueConfig,

    /// Delay between sends in a batch
    pub batch_pacing: Duration,

    /// Backlog at which the queue is reported as `warning`
    pub warning_threshold: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            batch_pacing: Duration::from_millis(500),
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }
}

impl ProducerConfig {
    /// Build from the queue variables plus `PRODUCER_BATCH_PACING_MS` and
    /// `QUEUE_WARNING_THRESHOLD`.
    pub fn from_env() -> Self {
        Self::from_lookup(QueueConfig::from_env(), |key| std::env::var(key).ok())
    }

    fn from_lookup(queue: QueueConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = Self::default();

        Self {
            queue,
            batch_pacing: number("PRODUCER_BATCH_PACING_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.batch_pacing),
            warning_threshold: number("QUEUE_WARNING_THRESHOLD")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.warning_threshold),
        }
    }
}
