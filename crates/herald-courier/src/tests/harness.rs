//! Test harness for courier tests.
//!
//! Provides:
//! - MockQueue: scripted pops, timeouts and transport errors
//! - MockGateway: scripted post outcomes with a record of what was posted
//! - TestHarness: a Courier wired to both, on a short test configuration

use crate::config::{ConsumerProfile, CourierConfig};
use crate::courier::Courier;
use crate::shutdown::{self, ShutdownTrigger};
use async_trait::async_trait;
use herald_gateway::{GatewayError, GatewayResult, Identity, PostOutcome, PostSummary};
use herald_queue::{QueueError, QueueItem, QueueResult, QueueTransport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const QUEUE: &str = "tweet_queue";

/// A complete alpha event.
pub const ALPHA_EVENT: &str = r#"{"type":"alpha_new_token","chain":"BASE","name":"Foo","symbol":"FOO","amount":1500000,"contract":"0xabc","explorer":"https://x"}"#;

/// An alpha event missing everything but the chain.
pub const INCOMPLETE_ALPHA_EVENT: &str = r#"{"type":"alpha_new_token","chain":"BASE"}"#;

/// One scripted response to a pop.
#[derive(Debug, Clone)]
pub enum PopScript {
    /// Hand out this payload
    Item(Vec<u8>),
    /// Wait out the timeout and return nothing
    Timeout,
    /// Fail with a connection-level error
    ConnectionLost,
    /// Fail with a non-connection error
    ProtocolError,
}

impl PopScript {
    pub fn item(payload: &str) -> Self {
        PopScript::Item(payload.as_bytes().to_vec())
    }
}

/// Scripted queue transport.
///
/// When the script runs out the queue behaves as empty and, if a trigger
/// was attached, fires shutdown so `run()` returns.
#[derive(Default)]
pub struct MockQueue {
    pops: Mutex<VecDeque<PopScript>>,
    reconnects: Mutex<VecDeque<bool>>,
    pushed: Mutex<Vec<Vec<u8>>>,
    drained: Mutex<Option<Arc<ShutdownTrigger>>>,
    pop_calls: AtomicUsize,
    reconnect_calls: AtomicUsize,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, steps: impl IntoIterator<Item = PopScript>) {
        self.pops.lock().extend(steps);
    }

    /// Outcomes for successive reconnect attempts; success once exhausted.
    pub fn script_reconnects(&self, results: impl IntoIterator<Item = bool>) {
        self.reconnects.lock().extend(results);
    }

    pub fn shutdown_when_drained(&self, trigger: Arc<ShutdownTrigger>) {
        *self.drained.lock() = Some(trigger);
    }

    pub fn pop_calls(&self) -> usize {
        self.pop_calls.load(Ordering::SeqCst)
    }

    pub fn reconnect_calls(&self) -> usize {
        self.reconnect_calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.pops.lock().len()
    }

    fn next(&self) -> Option<PopScript> {
        self.pop_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.pops.lock().pop_front();
        if step.is_none() {
            if let Some(trigger) = self.drained.lock().as_ref() {
                trigger.trigger();
            }
        }
        step
    }

    fn resolve(step: PopScript) -> QueueResult<Option<QueueItem>> {
        match step {
            PopScript::Item(payload) => Ok(Some(QueueItem {
                source_queue: QUEUE.to_string(),
                payload,
            })),
            PopScript::Timeout => Ok(None),
            PopScript::ConnectionLost => Err(QueueError::Connection("connection reset".into())),
            PopScript::ProtocolError => Err(QueueError::Protocol("unexpected reply".into())),
        }
    }
}

#[async_trait]
impl QueueTransport for MockQueue {
    async fn pop_blocking(&self, _queue: &str, timeout: Duration) -> QueueResult<Option<QueueItem>> {
        match self.next() {
            Some(PopScript::Timeout) | None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
            Some(step) => Self::resolve(step),
        }
    }

    async fn pop_now(&self, _queue: &str) -> QueueResult<Option<QueueItem>> {
        match self.next() {
            Some(step) => Self::resolve(step),
            None => Ok(None),
        }
    }

    async fn push(&self, _queue: &str, payload: &[u8]) -> QueueResult<u64> {
        let mut pushed = self.pushed.lock();
        pushed.push(payload.to_vec());
        Ok(pushed.len() as u64)
    }

    async fn length(&self, _queue: &str) -> QueueResult<u64> {
        Ok(self.pops.lock().len() as u64)
    }

    async fn ping(&self) -> QueueResult<()> {
        Ok(())
    }

    async fn reconnect(&self) -> QueueResult<()> {
        self.reconnect_calls.fetch_add(1, Ordering::SeqCst);
        match self.reconnects.lock().pop_front() {
            Some(false) => Err(QueueError::Connection("still down".into())),
            _ => Ok(()),
        }
    }
}

/// Scripted posting gateway.
///
/// Returns scripted outcomes in order, then successes.
#[derive(Default)]
pub struct MockGateway {
    outcomes: Mutex<VecDeque<PostOutcome>>,
    posted: Mutex<Vec<String>>,
    identity_error: Mutex<Option<u16>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, outcomes: impl IntoIterator<Item = PostOutcome>) {
        self.outcomes.lock().extend(outcomes);
    }

    /// Make identity lookups fail with this HTTP status.
    pub fn fail_identity(&self, status: u16) {
        *self.identity_error.lock() = Some(status);
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posted.lock().len()
    }
}

#[async_trait]
impl herald_gateway::PostingGateway for MockGateway {
    async fn post(&self, text: &str) -> PostOutcome {
        let n = {
            let mut posted = self.posted.lock();
            posted.push(text.to_string());
            posted.len()
        };
        self.outcomes.lock().pop_front().unwrap_or_else(|| {
            PostOutcome::success(n.to_string(), format!("https://twitter.com/user/status/{}", n))
        })
    }

    async fn identity(&self) -> GatewayResult<Identity> {
        if let Some(status) = *self.identity_error.lock() {
            return Err(GatewayError::Api {
                status,
                message: "scripted failure".into(),
            });
        }
        Ok(Identity {
            id: "1".into(),
            username: "herald_bot".into(),
            display_name: "Herald".into(),
            followers_count: 10,
            following_count: 2,
            post_count: 3,
        })
    }

    async fn search(&self, _query: &str, _max_results: u32) -> GatewayResult<Vec<PostSummary>> {
        Ok(Vec::new())
    }
}

pub fn rejected() -> PostOutcome {
    PostOutcome::rejected("HTTP 403: duplicate content")
}

pub fn rate_limited(secs: u64) -> PostOutcome {
    PostOutcome::RateLimited {
        retry_after: Some(Duration::from_secs(secs)),
    }
}

/// Configuration used by the tests: default timings, fixed instance name.
pub fn test_config(profile: ConsumerProfile) -> CourierConfig {
    CourierConfig {
        profile,
        instance_name: "herald-test".into(),
        ..Default::default()
    }
}

/// A courier wired to mocks.
pub struct TestHarness {
    pub queue: Arc<MockQueue>,
    pub gateway: Arc<MockGateway>,
    pub courier: Courier,
    pub trigger: Arc<ShutdownTrigger>,
}

impl TestHarness {
    pub fn new(profile: ConsumerProfile) -> Self {
        Self::with_config(test_config(profile))
    }

    pub fn with_config(config: CourierConfig) -> Self {
        let queue = Arc::new(MockQueue::new());
        let gateway = Arc::new(MockGateway::new());
        let (trigger, shutdown) = shutdown::channel();
        let courier = Courier::new(config, queue.clone(), gateway.clone(), shutdown).unwrap();

        Self {
            queue,
            gateway,
            courier,
            trigger: Arc::new(trigger),
        }
    }

    /// A harness whose queue fires shutdown once its script is drained.
    pub fn stopping_when_drained(profile: ConsumerProfile) -> Self {
        let harness = Self::new(profile);
        harness.queue.shutdown_when_drained(harness.trigger.clone());
        harness
    }
}
