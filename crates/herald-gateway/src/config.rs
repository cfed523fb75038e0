//! Gateway configuration.

use crate::policy::PostingPolicy;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_MAX_LENGTH: usize = 280;
pub const DEFAULT_RATE_LIMIT_BUFFER_MINUTES: u64 = 5;
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// OAuth 2.0 user-context token. Required unless running dry.
    pub access_token: Option<String>,

    /// API root, without trailing slash
    pub api_base: String,

    /// Maximum post length in characters
    pub max_length: usize,

    /// Upper bound on a single rate-limit wait
    pub rate_limit_buffer: Duration,

    /// Rate-limit retries per post. 0 means unbounded.
    pub max_rate_limit_retries: u32,

    /// HTTP request timeout
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            rate_limit_buffer: Duration::from_secs(DEFAULT_RATE_LIMIT_BUFFER_MINUTES * 60),
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("api_base", &self.api_base)
            .field("max_length", &self.max_length)
            .field("rate_limit_buffer", &self.rate_limit_buffer)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Build from `TWITTER_ACCESS_TOKEN`, `TWITTER_API_BASE`,
    /// `MAX_TWEET_LENGTH`, `RATE_LIMIT_BUFFER` (minutes),
    /// `MAX_RATE_LIMIT_RETRIES` and `TWITTER_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let access_token = non_empty("TWITTER_ACCESS_TOKEN");
        let api_base = non_empty("TWITTER_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let max_length = non_empty("MAX_TWEET_LENGTH")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_length);
        let rate_limit_buffer = non_empty("RATE_LIMIT_BUFFER")
            .and_then(|v| v.parse::<u64>().ok())
            .map(|minutes| Duration::from_secs(minutes * 60))
            .unwrap_or(defaults.rate_limit_buffer);
        let max_rate_limit_retries = non_empty("MAX_RATE_LIMIT_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_rate_limit_retries);
        let timeout = non_empty("TWITTER_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            access_token,
            api_base,
            max_length,
            rate_limit_buffer,
            max_rate_limit_retries,
            timeout,
        }
    }

    /// The posting policy these settings describe.
    pub fn policy(&self) -> PostingPolicy {
        PostingPolicy {
            max_length: self.max_length,
            rate_limit_buffer: self.rate_limit_buffer,
            max_rate_limit_retries: self.max_rate_limit_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[]));
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.rate_limit_buffer, Duration::from_secs(300));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("TWITTER_ACCESS_TOKEN", "token"),
            ("TWITTER_API_BASE", "http://localhost:8080/"),
            ("MAX_TWEET_LENGTH", "140"),
            ("RATE_LIMIT_BUFFER", "1"),
            ("MAX_RATE_LIMIT_RETRIES", "0"),
        ]));
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.api_base, "http://localhost:8080");
        let policy = config.policy();
        assert_eq!(policy.max_length, 140);
        assert_eq!(policy.rate_limit_buffer, Duration::from_secs(60));
        assert_eq!(policy.max_rate_limit_retries, 0);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("MAX_TWEET_LENGTH", "lots"),
            ("RATE_LIMIT_BUFFER", "-1"),
            ("TWITTER_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.rate_limit_buffer, Duration::from_secs(300));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = GatewayConfig {
            access_token: Some("secret-token".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
    }
}
