//! Gateway that publishes nothing.

use crate::error::GatewayResult;
use crate::gateway::PostingGateway;
use crate::outcome::{Identity, PostOutcome, PostSummary};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Recent posts kept for `search`.
pub const DEFAULT_HISTORY: usize = 100;

/// Logs every post and reports a synthetic success.
#[derive(Debug)]
pub struct DryRunGateway {
    count: AtomicU64,
    history: Mutex<VecDeque<(u64, String)>>,
    history_limit: usize,
}

impl Default for DryRunGateway {
    fn default() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` recent posts.
    pub fn with_history(limit: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            history: Mutex::new(VecDeque::with_capacity(limit)),
            history_limit: limit,
        }
    }

    /// Recent "posts", oldest first.
    pub fn posted(&self) -> Vec<String> {
        self.history.lock().iter().map(|(_, text)| text.clone()).collect()
    }
}

#[async_trait]
impl PostingGateway for DryRunGateway {
    async fn post(&self, text: &str) -> PostOutcome {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        if self.history_limit > 0 {
            let mut history = self.history.lock();
            if history.len() == self.history_limit {
                history.pop_front();
            }
            history.push_back((n, text.to_string()));
        }

        let id = format!("dry-run-{}", n);
        info!(post_id = %id, content = %text, "Dry run, not posting");
        let url = format!("dry-run://{}", id);
        PostOutcome::success(id, url)
    }

    async fn identity(&self) -> GatewayResult<Identity> {
        Ok(Identity {
            id: "dry-run".to_string(),
            username: "dry_run".to_string(),
            display_name: "Dry Run".to_string(),
            followers_count: 0,
            following_count: 0,
            post_count: self.count.load(Ordering::Relaxed),
        })
    }

    async fn search(&self, query: &str, max_results: u32) -> GatewayResult<Vec<PostSummary>> {
        let history = self.history.lock();
        Ok(history
            .iter()
            .filter(|(_, text)| text.contains(query))
            .take(max_results as usize)
            .map(|(n, text)| PostSummary {
                id: format!("dry-run-{}", n),
                text: text.clone(),
                created_at: None,
                like_count: 0,
                repost_count: 0,
                reply_count: 0,
            })
            .collect())
    }
}
