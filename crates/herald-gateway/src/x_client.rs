//! X (Twitter) API v2 client.
//!
//! Uses an OAuth 2.0 user-context bearer token. Only the three endpoints the
//! pipeline needs are wrapped: create post, look up the authenticated user
//! and recent search.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::PostingGateway;
use crate::outcome::{Identity, PostOutcome, PostSummary};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const POST_URL_PREFIX: &str = "https://twitter.com/user/status/";
const SEARCH_MIN_RESULTS: u32 = 10;
const SEARCH_MAX_RESULTS: u32 = 100;
const ERROR_BODY_LIMIT: usize = 200;

/// X API v2 client.
#[derive(Clone)]
pub struct XClient {
    http_client: reqwest::Client,
    access_token: String,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
    name: String,
    #[serde(default)]
    public_metrics: UserMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetrics {
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    following_count: u64,
    #[serde(default)]
    tweet_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
    text: String,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: PostMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PostMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
}

impl XClient {
    /// Create a client with the given token and settings.
    ///
    /// # Errors
    /// Returns `GatewayError::Config` if `api_base` is not an http(s) URL.
    pub fn new(access_token: impl Into<String>, config: &GatewayConfig) -> GatewayResult<Self> {
        let api_base = config.api_base.trim_end_matches('/');
        match reqwest::Url::parse(api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(GatewayError::Config(format!(
                    "TWITTER_API_BASE must be an http(s) URL, got `{}`",
                    api_base
                )))
            }
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            api_base: api_base.to_string(),
        })
    }

    /// Create a client from a config that carries a token.
    ///
    /// # Errors
    /// Returns `GatewayError::MissingCredentials` if no token is configured.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let token = config
            .access_token
            .clone()
            .ok_or(GatewayError::MissingCredentials)?;
        Self::new(token, config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Turn a non-success lookup response into an error.
    async fn lookup_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return GatewayError::RateLimited {
                retry_after: retry_after_from_headers(response.headers(), now_epoch()),
            };
        }
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), "X API error");
        GatewayError::Api {
            status: status.as_u16(),
            message: clip(&body),
        }
    }
}

#[async_trait]
impl PostingGateway for XClient {
    async fn post(&self, text: &str) -> PostOutcome {
        debug!(chars = text.chars().count(), "Sending post to X");

        let response = match self
            .http_client
            .post(self.url("/2/tweets"))
            .bearer_auth(&self.access_token)
            .json(&CreatePostRequest { text })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Post request failed");
                return PostOutcome::transient(e.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return PostOutcome::transient(format!("failed to read response: {}", e)),
            };
            return match parse_created_post(&body) {
                Ok(id) => {
                    let url = post_url(&id);
                    info!(post_id = %id, url = %url, "Post published");
                    PostOutcome::success(id, url)
                }
                Err(e) => PostOutcome::transient(e.to_string()),
            };
        }

        let retry_after = retry_after_from_headers(response.headers(), now_epoch());
        let body = response.text().await.unwrap_or_default();
        classify_failure(status, retry_after, &body)
    }

    async fn identity(&self) -> GatewayResult<Identity> {
        let response = self
            .http_client
            .get(self.url("/2/users/me"))
            .bearer_auth(&self.access_token)
            .query(&[("user.fields", "public_metrics")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::lookup_error(response).await);
        }

        let envelope: Envelope<UserData> = response.json().await?;
        let user = envelope
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("No user in response".to_string()))?;

        Ok(Identity {
            id: user.id,
            username: user.username,
            display_name: user.name,
            followers_count: user.public_metrics.followers_count,
            following_count: user.public_metrics.following_count,
            post_count: user.public_metrics.tweet_count,
        })
    }

    async fn search(&self, query: &str, max_results: u32) -> GatewayResult<Vec<PostSummary>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .http_client
            .get(self.url("/2/tweets/search/recent"))
            .bearer_auth(&self.access_token)
            .query(&[
                ("query", query.to_string()),
                ("max_results", search_page_size(max_results).to_string()),
                ("tweet.fields", "created_at,public_metrics".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::lookup_error(response).await);
        }

        // An empty result set comes back without `data`.
        let envelope: Envelope<Vec<SearchHit>> = response.json().await?;
        let hits = envelope.data.unwrap_or_default();

        Ok(hits
            .into_iter()
            .take(max_results as usize)
            .map(|hit| PostSummary {
                id: hit.id,
                text: hit.text,
                created_at: hit.created_at,
                like_count: hit.public_metrics.like_count,
                repost_count: hit.public_metrics.retweet_count,
                reply_count: hit.public_metrics.reply_count,
            })
            .collect())
    }
}

/// Public URL of a post.
pub fn post_url(id: &str) -> String {
    format!("{}{}", POST_URL_PREFIX, id)
}

/// Page size to request; the API accepts 10..=100.
fn search_page_size(max_results: u32) -> u32 {
    max_results.clamp(SEARCH_MIN_RESULTS, SEARCH_MAX_RESULTS)
}

fn parse_created_post(body: &str) -> GatewayResult<String> {
    let envelope: Envelope<CreatedPost> = serde_json::from_str(body)?;
    envelope
        .data
        .map(|post| post.id)
        .ok_or_else(|| GatewayError::InvalidResponse("No post id in response".to_string()))
}

/// Map a non-success post response onto an outcome.
fn classify_failure(status: StatusCode, retry_after: Option<Duration>, body: &str) -> PostOutcome {
    let detail = clip(body);
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(retry_after_secs = retry_after.map(|d| d.as_secs()), "Post rate limited");
        PostOutcome::RateLimited { retry_after }
    } else if status.is_client_error() {
        error!(status = status.as_u16(), body = %detail, "Post rejected");
        PostOutcome::rejected(format!("HTTP {}: {}", status.as_u16(), detail))
    } else {
        warn!(status = status.as_u16(), body = %detail, "Post failed");
        PostOutcome::transient(format!("HTTP {}: {}", status.as_u16(), detail))
    }
}

/// Read the wait hint from `retry-after` (seconds) or `x-rate-limit-reset`
/// (epoch seconds).
fn retry_after_from_headers(headers: &HeaderMap, now_epoch: i64) -> Option<Duration> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(secs) = header("retry-after") {
        return u64::try_from(secs).ok().map(Duration::from_secs);
    }
    header("x-rate-limit-reset")
        .map(|reset| Duration::from_secs(reset.saturating_sub(now_epoch).max(0) as u64))
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

fn clip(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let mut clipped: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        clipped.push('…');
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_post_url() {
        assert_eq!(post_url("123"), "https://twitter.com/user/status/123");
    }

    #[test]
    fn test_parse_created_post() {
        let body = r#"{"data":{"id":"1445880548472328192","text":"hello"}}"#;
        assert_eq!(parse_created_post(body).unwrap(), "1445880548472328192");
        assert!(matches!(
            parse_created_post(r#"{"errors":[]}"#),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert!(matches!(parse_created_post("<html>"), Err(GatewayError::Json(_))));
    }

    #[test]
    fn test_retry_after_header() {
        let wait = retry_after_from_headers(&headers(&[("retry-after", "2")]), 0);
        assert_eq!(wait, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_rate_limit_reset_header() {
        let wait = retry_after_from_headers(&headers(&[("x-rate-limit-reset", "1000090")]), 1_000_000);
        assert_eq!(wait, Some(Duration::from_secs(90)));

        // Reset already passed.
        let wait = retry_after_from_headers(&headers(&[("x-rate-limit-reset", "5")]), 1_000_000);
        assert_eq!(wait, Some(Duration::ZERO));
    }

    #[test]
    fn test_no_usable_hint() {
        assert_eq!(retry_after_from_headers(&HeaderMap::new(), 0), None);
        assert_eq!(
            retry_after_from_headers(&headers(&[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")]), 0),
            None
        );
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(5)), ""),
            PostOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(5))
            }
        );
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, None, "duplicate content"),
            PostOutcome::Rejected { reason } if reason == "HTTP 403: duplicate content"
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, None, ""),
            PostOutcome::Rejected { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, None, "upstream"),
            PostOutcome::TransientError { .. }
        ));
    }

    #[test]
    fn test_search_page_size() {
        assert_eq!(search_page_size(1), 10);
        assert_eq!(search_page_size(50), 50);
        assert_eq!(search_page_size(500), 100);
    }

    #[test]
    fn test_clip_long_bodies() {
        let clipped = clip(&"x".repeat(500));
        assert_eq!(clipped.chars().count(), ERROR_BODY_LIMIT + 1);
    }

    #[test]
    fn test_api_base_must_be_http() {
        for api_base in ["api.twitter.com", "ftp://api.twitter.com", ""] {
            let config = GatewayConfig {
                api_base: api_base.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(XClient::new("token", &config), Err(GatewayError::Config(_))),
                "accepted {:?}",
                api_base
            );
        }

        let config = GatewayConfig {
            api_base: "http://localhost:8080/".into(),
            ..Default::default()
        };
        let client = XClient::new("token", &config).unwrap();
        assert_eq!(client.url("/2/tweets"), "http://localhost:8080/2/tweets");
    }

    #[test]
    fn test_from_config_requires_token() {
        assert!(matches!(
            XClient::from_config(&GatewayConfig::default()),
            Err(GatewayError::MissingCredentials)
        ));
    }
}
