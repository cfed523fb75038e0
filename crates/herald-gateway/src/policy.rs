//! Truncation and rate-limit handling around a single post.

use crate::config::{
    DEFAULT_MAX_LENGTH, DEFAULT_MAX_RATE_LIMIT_RETRIES, DEFAULT_RATE_LIMIT_BUFFER_MINUTES,
};
use crate::gateway::PostingGateway;
use crate::outcome::PostOutcome;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{info, warn};

const ELLIPSIS: &str = "...";

/// How a post is prepared and retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPolicy {
    /// Maximum post length in characters.
    pub max_length: usize,
    /// Upper bound on a single rate-limit wait.
    pub rate_limit_buffer: Duration,
    /// Rate-limit retries per post. 0 means unbounded.
    pub max_rate_limit_retries: u32,
}

impl Default for PostingPolicy {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            rate_limit_buffer: Duration::from_secs(DEFAULT_RATE_LIMIT_BUFFER_MINUTES * 60),
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
        }
    }
}

/// What happened to one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Outcome of the last attempt.
    pub outcome: PostOutcome,
    /// Post calls made, including the first.
    pub attempts: u32,
    /// Rate-limit waits slept through.
    pub rate_limit_waits: u32,
    /// Whether the content was shortened.
    pub truncated: bool,
    /// The text that was actually sent.
    pub content: String,
}

impl PostingPolicy {
    /// Shorten `text` to `max_length` characters, ending in `...`.
    ///
    /// Limits too small to hold the ellipsis get a plain cut.
    pub fn truncate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.chars().count() <= self.max_length {
            return Cow::Borrowed(text);
        }
        if self.max_length <= ELLIPSIS.len() {
            return Cow::Owned(text.chars().take(self.max_length).collect());
        }
        let keep = self.max_length - ELLIPSIS.len();
        let mut shortened: String = text.chars().take(keep).collect();
        shortened.push_str(ELLIPSIS);
        Cow::Owned(shortened)
    }

    /// How long to wait after a rate-limit signal.
    pub fn rate_limit_wait(&self, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.rate_limit_buffer),
            None => self.rate_limit_buffer,
        }
    }

    fn retries_exhausted(&self, waits: u32) -> bool {
        self.max_rate_limit_retries != 0 && waits >= self.max_rate_limit_retries
    }

    /// Post `text` through `gateway`, truncating first and waiting out
    /// rate limits until the retry cap is reached.
    ///
    /// Rejections and transient errors are returned as-is after one attempt.
    pub async fn submit(&self, gateway: &dyn PostingGateway, text: &str) -> Delivery {
        let content = self.truncate(text);
        let truncated = matches!(content, Cow::Owned(_));
        if truncated {
            warn!(
                original_chars = text.chars().count(),
                max_length = self.max_length,
                "Content exceeds maximum length, truncating"
            );
        }

        let mut attempts = 0u32;
        let mut waits = 0u32;

        loop {
            attempts += 1;
            let outcome = gateway.post(&content).await;

            let retry_after = match outcome {
                PostOutcome::RateLimited { retry_after } => retry_after,
                outcome => {
                    return Delivery {
                        outcome,
                        attempts,
                        rate_limit_waits: waits,
                        truncated,
                        content: content.into_owned(),
                    }
                }
            };

            if self.retries_exhausted(waits) {
                warn!(
                    attempts,
                    max_rate_limit_retries = self.max_rate_limit_retries,
                    "Rate-limit retries exhausted, giving up on this post"
                );
                return Delivery {
                    outcome: PostOutcome::RateLimited { retry_after },
                    attempts,
                    rate_limit_waits: waits,
                    truncated,
                    content: content.into_owned(),
                };
            }

            let wait = self.rate_limit_wait(retry_after);
            info!(
                wait_secs = wait.as_secs_f64(),
                retry_after_secs = retry_after.map(|d| d.as_secs()),
                attempt = attempts,
                "Rate limited, waiting before retry"
            );
            tokio::time::sleep(wait).await;
            waits += 1;
        }
    }
}
