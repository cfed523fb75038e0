//! Queue connection settings.

use url::Url;

/// Default list name shared by producers and consumers.
pub const DEFAULT_QUEUE_NAME: &str = "tweet_queue";

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// List the pipeline reads from and writes to
    pub queue_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

impl QueueConfig {
    /// Build from the environment.
    ///
    /// `REDIS_URL` wins when set. Otherwise the URL is assembled from
    /// `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB` and `REDIS_PASSWORD`.
    /// `QUEUE_NAME` selects the list.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let redis_url = non_empty("REDIS_URL").unwrap_or_else(|| {
            let host = non_empty("REDIS_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
            let port: u16 = non_empty("REDIS_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(6379);
            let db: u32 = non_empty("REDIS_DB")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            assemble_url(&host, port, db, non_empty("REDIS_PASSWORD").as_deref())
        });

        let queue_name = non_empty("QUEUE_NAME").unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string());

        Self {
            redis_url,
            queue_name,
        }
    }

    /// Connection URL with any password masked, for logging.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.redis_url.split_once("://") else {
            return self.redis_url.clone();
        };
        match rest.rsplit_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}://{}:***@{}", scheme, user, host)
            }
            None => self.redis_url.clone(),
        }
    }
}

/// Build a `redis://` URL, percent-encoding the password.
///
/// A host the URL parser rejects is left for the Redis client to report.
fn assemble_url(host: &str, port: u16, db: u32, password: Option<&str>) -> String {
    let plain = format!("redis://{}:{}/{}", host, port, db);
    let Some(password) = password else {
        return plain;
    };
    let Ok(mut url) = Url::parse(&plain) else {
        return plain;
    };
    // `set_password` leaves `%` alone
    if url.set_password(Some(&password.replace('%', "%25"))).is_err() {
        return plain;
    }
    url.into()
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
        let config = QueueConfig::from_lookup(lookup(&[]));
        assert_eq!(config, QueueConfig::default());
    }

    #[test]
    fn test_assembled_url() {
        let config = QueueConfig::from_lookup(lookup(&[
            ("REDIS_HOST", "redis.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "2"),
            ("REDIS_PASSWORD", "s3cret"),
            ("QUEUE_NAME", "alpha_queue"),
        ]));
        assert_eq!(config.redis_url, "redis://:s3cret@redis.internal:6380/2");
        assert_eq!(config.queue_name, "alpha_queue");
        assert_eq!(config.redacted_url(), "redis://:***@redis.internal:6380/2");
    }

    #[test]
    fn test_password_is_percent_encoded() {
        let config = QueueConfig::from_lookup(lookup(&[("REDIS_PASSWORD", "p@ss/w#rd:50%")]));
        assert_eq!(
            config.redis_url,
            "redis://:p%40ss%2Fw%23rd%3A50%25@127.0.0.1:6379/0"
        );
        assert_eq!(config.redacted_url(), "redis://:***@127.0.0.1:6379/0");

        let client = redis::Client::open(config.redis_url.as_str()).unwrap();
        let info = client.get_connection_info();
        assert_eq!(info.redis.password.as_deref(), Some("p@ss/w#rd:50%"));
        assert_eq!(info.redis.db, 0);
    }

    #[test]
    fn test_redis_url_wins() {
        let config = QueueConfig::from_lookup(lookup(&[
            ("REDIS_URL", "redis://cache:6379/1"),
            ("REDIS_HOST", "ignored"),
        ]));
        assert_eq!(config.redis_url, "redis://cache:6379/1");
        assert_eq!(config.redacted_url(), "redis://cache:6379/1");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = QueueConfig::from_lookup(lookup(&[("REDIS_PORT", "not-a-port")]));
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379/0");
    }
}
