//! Per-process consumer state.

use serde::Serialize;

/// Loop state owned by a single courier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerState {
    pub running: bool,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
}

impl ConsumerState {
    pub fn new(max_consecutive_failures: u32) -> Self {
        Self {
            running: false,
            consecutive_failures: 0,
            max_consecutive_failures: max_consecutive_failures.max(1),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Clear the counter after a cooldown or reconnect.
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures = (self.consecutive_failures + 1).min(self.max_consecutive_failures);
    }

    /// Whether the failure bound has been reached.
    pub fn needs_cooldown(&self) -> bool {
        self.consecutive_failures >= self.max_consecutive_failures
    }
}

/// Lifetime counters, reported in the status snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CourierStats {
    /// Posts the gateway accepted
    pub posted: u64,
    /// Post attempts that ended without success
    pub failed: u64,
    /// Events rejected by validation or rendering
    pub invalid: u64,
    /// Malformed payloads and events for other profiles
    pub discarded: u64,
    /// Cooldowns entered
    pub cooldowns: u64,
    /// Successful queue reconnects
    pub reconnects: u64,
}
