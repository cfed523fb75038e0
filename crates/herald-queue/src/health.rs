//! Queue backlog assessment.

use crate::error::QueueResult;
use crate::transport::QueueTransport;
use serde::Serialize;

/// Backlog size at which a queue is reported as `warning`.
pub const DEFAULT_WARNING_THRESHOLD: u64 = 1000;

/// Coarse queue health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueueHealth {
    Healthy { length: u64 },
    Warning { length: u64 },
    Error { reason: String },
}

impl QueueHealth {
    /// Classify a length probe against `threshold`.
    pub fn assess(length: QueueResult<u64>, threshold: u64) -> Self {
        match length {
            Ok(length) if length < threshold => QueueHealth::Healthy { length },
            Ok(length) => QueueHealth::Warning { length },
            Err(e) => QueueHealth::Error {
                reason: e.to_string(),
            },
        }
    }

    /// Probe `queue` on `transport`.
    pub async fn probe(transport: &dyn QueueTransport, queue: &str, threshold: u64) -> Self {
        Self::assess(transport.length(queue).await, threshold)
    }

    pub fn length(&self) -> Option<u64> {
        match self {
            QueueHealth::Healthy { length } | QueueHealth::Warning { length } => Some(*length),
            QueueHealth::Error { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueueHealth::Healthy { .. } => "healthy",
            QueueHealth::Warning { .. } => "warning",
            QueueHealth::Error { .. } => "error",
        }
    }
}
