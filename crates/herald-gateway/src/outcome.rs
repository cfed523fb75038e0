//! Values reported by the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A post the destination accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub url: String,
}

/// Result of a single post attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// The post is live.
    Success(PublishedPost),
    /// The destination asked us to wait. `None` when it gave no usable hint.
    RateLimited { retry_after: Option<Duration> },
    /// The destination refused this content. Retrying will not help.
    Rejected { reason: String },
    /// Network or server trouble on this attempt.
    TransientError { reason: String },
}

impl PostOutcome {
    pub fn success(id: impl Into<String>, url: impl Into<String>) -> Self {
        PostOutcome::Success(PublishedPost {
            id: id.into(),
            url: url.into(),
        })
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        PostOutcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        PostOutcome::TransientError {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PostOutcome::Success(_))
    }

    /// The published post, if any.
    pub fn published(&self) -> Option<&PublishedPost> {
        match self {
            PostOutcome::Success(post) => Some(post),
            _ => None,
        }
    }
}

impl fmt::Display for PostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostOutcome::Success(post) => write!(f, "posted {} ({})", post.id, post.url),
            PostOutcome::RateLimited {
                retry_after: Some(wait),
            } => write!(f, "rate limited, retry after {}s", wait.as_secs()),
            PostOutcome::RateLimited { retry_after: None } => write!(f, "rate limited"),
            PostOutcome::Rejected { reason } => write!(f, "rejected: {}", reason),
            PostOutcome::TransientError { reason } => write!(f, "transient error: {}", reason),
        }
    }
}

/// The account the gateway posts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub post_count: u64,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub like_count: u64,
    pub repost_count: u64,
    pub reply_count: u64,
}

/// Coarse gateway health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum GatewayStatus {
    Ok,
    RateLimited,
    Error(String),
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayStatus::Ok => write!(f, "ok"),
            GatewayStatus::RateLimited => write!(f, "rate_limited"),
            GatewayStatus::Error(e) => write!(f, "error: {}", e),
        }
    }
}
