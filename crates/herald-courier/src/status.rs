//! Point-in-time view of a courier.

use crate::state::CourierStats;
use herald_gateway::{GatewayStatus, Identity};
use herald_queue::QueueHealth;
use serde::Serialize;
use std::fmt;

/// Status snapshot for the `status` command and startup log.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub instance: String,
    pub profile: String,
    pub queue: String,
    pub queue_health: QueueHealth,
    pub gateway: GatewayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub dry_run: bool,
    pub running: bool,
    pub consecutive_failures: u32,
    pub max_consecutive_failures: u32,
    pub stats: CourierStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instance:        {}", self.instance)?;
        writeln!(f, "Profile:         {}", self.profile)?;
        match self.queue_health.length() {
            Some(length) => writeln!(
                f,
                "Queue:           {} ({} items, {})",
                self.queue,
                length,
                self.queue_health.label()
            )?,
            None => writeln!(f, "Queue:           {} (unreachable)", self.queue)?,
        }
        writeln!(f, "Gateway:         {}", self.gateway)?;
        if let Some(identity) = &self.identity {
            writeln!(
                f,
                "Account:         @{} ({} followers, {} posts)",
                identity.username, identity.followers_count, identity.post_count
            )?;
        }
        writeln!(f, "Dry run:         {}", self.dry_run)?;
        writeln!(f, "Running:         {}", self.running)?;
        writeln!(
            f,
            "Failures:        {}/{}",
            self.consecutive_failures, self.max_consecutive_failures
        )?;
        write!(
            f,
            "Totals:          posted={} failed={} invalid={} discarded={}",
            self.stats.posted, self.stats.failed, self.stats.invalid, self.stats.discarded
        )
    }
}
