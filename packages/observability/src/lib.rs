//! # Observability
//!
//! Logging setup shared by the Herald binaries.
//!
//! Binaries call [`init_with_config`] once at startup and log through the
//! standard `tracing` macros everywhere else. Two sinks are available:
//!
//! - a compact human-readable layer on stderr
//! - an optional JSONL file, one object per event, for `tail -f | jq`, with
//!   the pipeline's correlation keys at the top level
//!
//! `RUST_LOG` overrides the configured default level for both.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "herald-courier".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..observability::LogConfig::from_env()
//!     });
//! }
//! ```

mod file;
mod json_layer;

pub use file::{default_log_path, FileLogWriter};
pub use json_layer::{JsonLayer, LogEntry, CORRELATION_KEYS};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Name of the binary, included in every JSONL line.
    pub service_name: String,

    /// Default level filter. `RUST_LOG` takes precedence.
    pub default_level: String,

    /// JSONL log file. No file is written when `None`.
    pub log_path: Option<PathBuf>,

    /// Emit human-readable logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

impl LogConfig {
    /// Read `HERALD_LOG_FILE`: `1`/`true` selects [`default_log_path`], any
    /// other non-empty value is taken as a path, `0`/`false` disables it.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_path = lookup("HERALD_LOG_FILE").and_then(|raw| {
            match raw.trim() {
                "" | "0" | "false" => None,
                "1" | "true" => default_log_path(),
                path => Some(PathBuf::from(path)),
            }
        });

        Self {
            log_path,
            ..Default::default()
        }
    }
}

/// Initialize logging with defaults for `service_name`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Install the global subscriber.
///
/// If the log file cannot be opened the failure is reported on stderr and
/// logging continues without it. Without a file, stderr output is always
/// enabled. Calling this twice leaves the first subscriber in place.
pub fn init_with_config(config: LogConfig) {
    let file_layer = config.log_path.as_ref().and_then(|path| {
        match FileLogWriter::new(path) {
            Ok(writer) => Some(
                JsonLayer::new(config.service_name.clone(), writer)
                    .with_filter(env_filter(&config.default_level)),
            ),
            Err(e) => {
                eprintln!("failed to open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    let stderr_layer = (config.also_stderr || file_layer.is_none()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let has_file = file_layer.is_some();
    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed && has_file {
        if let Some(path) = &config.log_path {
            tracing::debug!(log_path = %path.display(), "observability initialized");
        }
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn test_log_file_from_env() {
        let config = LogConfig::from_lookup(|_| None);
        assert!(config.log_path.is_none());

        let config = LogConfig::from_lookup(|_| Some("0".into()));
        assert!(config.log_path.is_none());

        let config = LogConfig::from_lookup(|_| Some("/tmp/herald/test.jsonl".into()));
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/herald/test.jsonl")));

        let config = LogConfig::from_lookup(|_| Some("1".into()));
        assert_eq!(config.log_path, default_log_path());
    }
}
