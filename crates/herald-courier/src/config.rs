//! Configuration for the courier.

use crate::error::CourierError;
use herald_content::{EventKind, Template};
use herald_gateway::GatewayConfig;
use herald_queue::health::DEFAULT_WARNING_THRESHOLD;
use herald_queue::QueueConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which kinds of event a courier instance handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumerProfile {
    /// New-token announcements, rendered through the alpha template.
    #[default]
    Alpha,
    /// Everything carrying a pre-rendered `message`.
    Message,
}

impl ConsumerProfile {
    pub fn name(self) -> &'static str {
        match self {
            ConsumerProfile::Alpha => "alpha",
            ConsumerProfile::Message => "message",
        }
    }

    /// Whether events of `kind` belong to this profile.
    pub fn handles(self, kind: EventKind) -> bool {
        match self {
            ConsumerProfile::Alpha => kind == EventKind::AlphaNewToken,
            ConsumerProfile::Message => kind.is_message_kind(),
        }
    }

    /// Template used when no template file is configured.
    pub fn default_template(self) -> Template {
        match self {
            ConsumerProfile::Alpha => Template::alpha(),
            ConsumerProfile::Message => Template::message(),
        }
    }
}

impl fmt::Display for ConsumerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsumerProfile {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha" | "alpha_new_token" => Ok(ConsumerProfile::Alpha),
            "message" | "generic" | "messages" => Ok(ConsumerProfile::Message),
            other => Err(CourierError::Config(format!(
                "unknown profile `{}` (expected `alpha` or `message`)",
                other
            ))),
        }
    }
}

/// Courier configuration.
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Queue connection and list name
    pub queue: QueueConfig,

    /// Posting gateway settings
    pub gateway: GatewayConfig,

    /// Kinds this instance handles
    pub profile: ConsumerProfile,

    /// Blocking pop timeout, never zero
    pub pop_timeout: Duration,

    /// Consecutive failures that trigger a cooldown
    pub max_consecutive_failures: u32,

    /// Sleep after hitting the failure bound
    pub cooldown: Duration,

    /// Sleep after every item that reached validation
    pub pacing: Duration,

    /// Sleep before each reconnect attempt
    pub reconnect_backoff: Duration,

    /// Pause after a non-connection queue error
    pub error_pause: Duration,

    /// Template file overriding the profile's built-in template
    pub template_path: Option<PathBuf>,

    /// Log posts instead of publishing them
    pub dry_run: bool,

    /// Backlog at which the status snapshot reports `warning`
    pub warning_threshold: u64,

    /// Instance name (unique per process)
    pub instance_name: String,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            gateway: GatewayConfig::default(),
            profile: ConsumerProfile::default(),
            pop_timeout: Duration::from_secs(30),
            max_consecutive_failures: 5,
            cooldown: Duration::from_secs(60),
            pacing: Duration::from_secs(2),
            reconnect_backoff: Duration::from_secs(10),
            error_pause: Duration::from_secs(1),
            template_path: None,
            dry_run: false,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            instance_name: format!("herald-{}", uuid::Uuid::new_v4()),
        }
    }
}

impl CourierConfig {
    /// Build from the environment.
    ///
    /// Reads the queue and gateway variables plus `COURIER_PROFILE`,
    /// `COURIER_POP_TIMEOUT_SECS`, `COURIER_MAX_FAILURES`,
    /// `COURIER_COOLDOWN_SECS`, `COURIER_PACING_MS`,
    /// `COURIER_RECONNECT_SECS`, `COURIER_TEMPLATE`, `DRY_RUN` and
    /// `QUEUE_WARNING_THRESHOLD`. A zero pop timeout falls back to the
    /// default.
    pub fn from_env() -> Result<Self, CourierError> {
        Self::from_lookup(
            QueueConfig::from_env(),
            GatewayConfig::from_env(),
            |key| std::env::var(key).ok(),
        )
    }

    fn from_lookup(
        queue: QueueConfig,
        gateway: GatewayConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CourierError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |key: &str| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
        };
        let defaults = Self::default();

        let profile = match non_empty("COURIER_PROFILE") {
            Some(raw) => raw.parse()?,
            None => defaults.profile,
        };

        Ok(Self {
            queue,
            gateway,
            profile,
            pop_timeout: secs("COURIER_POP_TIMEOUT_SECS")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.pop_timeout),
            max_consecutive_failures: non_empty("COURIER_MAX_FAILURES")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_consecutive_failures),
            cooldown: secs("COURIER_COOLDOWN_SECS").unwrap_or(defaults.cooldown),
            pacing: non_empty("COURIER_PACING_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.pacing),
            reconnect_backoff: secs("COURIER_RECONNECT_SECS").unwrap_or(defaults.reconnect_backoff),
            error_pause: defaults.error_pause,
            template_path: non_empty("COURIER_TEMPLATE").map(PathBuf::from),
            dry_run: non_empty("DRY_RUN").is_some_and(|v| is_truthy(&v)),
            warning_threshold: non_empty("QUEUE_WARNING_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.warning_threshold),
            instance_name: defaults.instance_name,
        })
    }

    /// The template this instance renders with.
    pub fn load_template(&self) -> Result<Template, CourierError> {
        match &self.template_path {
            Some(path) => Ok(Template::from_file(path)?),
            None => Ok(self.profile.default_template()),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<CourierConfig, CourierError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CourierConfig::from_lookup(QueueConfig::default(), GatewayConfig::default(), |key| {
            map.get(key).cloned()
        })
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.profile, ConsumerProfile::Alpha);
        assert_eq!(config.pop_timeout, Duration::from_secs(30));
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.pacing, Duration::from_secs(2));
        assert_eq!(config.reconnect_backoff, Duration::from_secs(10));
        assert!(!config.dry_run);
        assert_eq!(config.warning_threshold, DEFAULT_WARNING_THRESHOLD);
        assert!(config.instance_name.starts_with("herald-"));
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("COURIER_PROFILE", "message"),
            ("COURIER_POP_TIMEOUT_SECS", "5"),
            ("COURIER_MAX_FAILURES", "3"),
            ("COURIER_PACING_MS", "250"),
            ("DRY_RUN", "true"),
            ("QUEUE_WARNING_THRESHOLD", "50"),
        ])
        .unwrap();
        assert_eq!(config.profile, ConsumerProfile::Message);
        assert_eq!(config.pop_timeout, Duration::from_secs(5));
        assert_eq!(config.max_consecutive_failures, 3);
        assert_eq!(config.pacing, Duration::from_millis(250));
        assert!(config.dry_run);
        assert_eq!(config.warning_threshold, 50);
    }

    #[test]
    fn test_zero_failure_bound_falls_back() {
        let config = from_pairs(&[("COURIER_MAX_FAILURES", "0")]).unwrap();
        assert_eq!(config.max_consecutive_failures, 5);
    }

    #[test]
    fn test_zero_pop_timeout_falls_back() {
        let config = from_pairs(&[("COURIER_POP_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.pop_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        assert!(matches!(
            from_pairs(&[("COURIER_PROFILE", "everything")]),
            Err(CourierError::Config(_))
        ));
    }

    #[test]
    fn test_profile_routing() {
        assert!(ConsumerProfile::Alpha.handles(EventKind::AlphaNewToken));
        assert!(!ConsumerProfile::Alpha.handles(EventKind::MonitoringAlert));
        assert!(ConsumerProfile::Message.handles(EventKind::Generic));
        assert!(ConsumerProfile::Message.handles(EventKind::Unknown));
        assert!(!ConsumerProfile::Message.handles(EventKind::AlphaNewToken));
    }

    #[test]
    fn test_template_file_overrides_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{symbol}} on {{chain}}").unwrap();

        let config = CourierConfig {
            template_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let template = config.load_template().unwrap();
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["symbol", "chain"]);
    }
}
