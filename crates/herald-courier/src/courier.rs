//! Main courier loop orchestration.

use crate::config::CourierConfig;
use crate::error::CourierResult;
use crate::shutdown::Shutdown;
use crate::state::{ConsumerState, CourierStats};
use crate::status::StatusSnapshot;
use herald_content::{classify, parse, validate, EventKind, Renderer, Template};
use herald_gateway::{
    DryRunGateway, GatewayHandle, GatewayStatus, PostOutcome, PostingPolicy, PublishedPost,
    XClient,
};
use herald_queue::{QueueHandle, QueueHealth, QueueItem, RedisQueue};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Characters of content included in log lines.
const PREVIEW_CHARS: usize = 100;

/// What a single iteration did with the queue.
#[derive(Debug, Clone)]
pub enum IterationOutcome {
    /// Pop timed out with nothing to do.
    Idle,
    /// Payload could not be decoded. Not counted.
    Malformed { reason: String },
    /// Event belongs to another profile. Not counted.
    Skipped { kind: EventKind },
    /// Missing field or render failure. Counted, nothing posted.
    Invalid { kind: EventKind, reason: String },
    /// The gateway published the post.
    Posted { kind: EventKind, post: PublishedPost },
    /// The gateway did not publish the post. Counted.
    Failed { kind: EventKind, outcome: PostOutcome },
}

impl IterationOutcome {
    /// Whether the item got as far as validation, which is what earns a
    /// pacing sleep.
    pub fn reached_validation(&self) -> bool {
        matches!(
            self,
            IterationOutcome::Invalid { .. }
                | IterationOutcome::Posted { .. }
                | IterationOutcome::Failed { .. }
        )
    }
}

/// The Herald courier.
///
/// Pops events, renders them and hands the text to the posting gateway,
/// one item at a time.
pub struct Courier {
    config: CourierConfig,
    queue: QueueHandle,
    gateway: GatewayHandle,
    policy: PostingPolicy,
    renderer: Renderer,
    template: Template,
    state: ConsumerState,
    stats: CourierStats,
    shutdown: Shutdown,
}

impl Courier {
    /// Create a courier over already-built transports.
    pub fn new(
        config: CourierConfig,
        queue: QueueHandle,
        gateway: GatewayHandle,
        shutdown: Shutdown,
    ) -> CourierResult<Self> {
        let template = config.load_template()?;
        let policy = config.gateway.policy();
        let state = ConsumerState::new(config.max_consecutive_failures);

        Ok(Self {
            config,
            queue,
            gateway,
            policy,
            renderer: Renderer::default(),
            template,
            state,
            stats: CourierStats::default(),
            shutdown,
        })
    }

    /// Connect to Redis and build the configured gateway.
    ///
    /// Fails if the queue is unreachable or no token is configured outside
    /// dry-run mode.
    pub async fn connect(config: CourierConfig, shutdown: Shutdown) -> CourierResult<Self> {
        let queue: QueueHandle = Arc::new(RedisQueue::connect(&config.queue).await?);

        let gateway: GatewayHandle = if config.dry_run {
            info!("Dry run enabled, posts will only be logged");
            Arc::new(DryRunGateway::new())
        } else {
            Arc::new(XClient::from_config(&config.gateway)?)
        };

        Self::new(config, queue, gateway, shutdown)
    }

    /// Check that the gateway accepts our credentials.
    ///
    /// A credential rejection is fatal; other lookup failures are logged
    /// and tolerated.
    pub async fn verify_gateway(&self) -> CourierResult<()> {
        match self.gateway.identity().await {
            Ok(identity) => {
                info!(
                    username = %identity.username,
                    followers = identity.followers_count,
                    "Posting as @{}",
                    identity.username
                );
                Ok(())
            }
            Err(e) if e.is_auth_error() => {
                error!(error = %e, "Posting credentials rejected");
                Err(e.into())
            }
            Err(e) => {
                warn!(error = %e, "Could not verify posting account, continuing");
                Ok(())
            }
        }
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    pub fn state(&self) -> &ConsumerState {
        &self.state
    }

    pub fn stats(&self) -> CourierStats {
        self.stats
    }

    /// Run until the shutdown token fires.
    ///
    /// Queue connection errors are retried forever with a fixed backoff;
    /// every other per-item problem is handled inside the iteration.
    pub async fn run(&mut self) -> CourierResult<()> {
        self.state.running = true;
        info!(
            instance = %self.config.instance_name,
            profile = %self.config.profile,
            queue = %self.config.queue.queue_name,
            "Starting courier loop"
        );

        while !self.shutdown.is_triggered() {
            match self.process_one_iteration().await {
                Ok(_) => {}
                Err(e) if e.is_connection_error() => {
                    error!(error = %e, "Lost connection to queue");
                    self.recover_transport().await;
                }
                Err(e) => {
                    error!(error = %e, "Queue error");
                    self.pause(self.config.error_pause).await;
                }
            }
        }

        self.state.running = false;
        info!(
            posted = self.stats.posted,
            failed = self.stats.failed,
            invalid = self.stats.invalid,
            discarded = self.stats.discarded,
            "Courier stopped"
        );
        Ok(())
    }

    /// Pop one item (waiting up to the pop timeout) and take it through
    /// the whole pipeline, including cooldown and pacing.
    pub async fn process_one_iteration(&mut self) -> CourierResult<IterationOutcome> {
        let item = self
            .queue
            .pop_blocking(&self.config.queue.queue_name, self.config.pop_timeout)
            .await?;

        let Some(item) = item else {
            debug!("No items available, continuing to poll...");
            return Ok(IterationOutcome::Idle);
        };

        let outcome = self.handle_item(item).await;

        if self.state.needs_cooldown() {
            self.cooldown().await;
        }

        if outcome.reached_validation() {
            self.pause(self.config.pacing).await;
        }

        Ok(outcome)
    }

    /// Take whatever is at the tail of the queue right now, if anything.
    /// No cooldown or pacing is applied.
    pub async fn process_next_available(&mut self) -> CourierResult<IterationOutcome> {
        match self.queue.pop_now(&self.config.queue.queue_name).await? {
            Some(item) => Ok(self.handle_item(item).await),
            None => {
                info!(queue = %self.config.queue.queue_name, "Queue is empty");
                Ok(IterationOutcome::Idle)
            }
        }
    }

    /// Current queue, gateway and counter state.
    pub async fn status_snapshot(&self) -> StatusSnapshot {
        let queue_health = QueueHealth::probe(
            self.queue.as_ref(),
            &self.config.queue.queue_name,
            self.config.warning_threshold,
        )
        .await;

        let gateway = self.gateway.status().await;
        let identity = match gateway {
            GatewayStatus::Ok => self.gateway.identity().await.ok(),
            _ => None,
        };

        StatusSnapshot {
            instance: self.config.instance_name.clone(),
            profile: self.config.profile.to_string(),
            queue: self.config.queue.queue_name.clone(),
            queue_health,
            gateway,
            identity,
            dry_run: self.config.dry_run,
            running: self.state.running,
            consecutive_failures: self.state.consecutive_failures(),
            max_consecutive_failures: self.state.max_consecutive_failures(),
            stats: self.stats,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Parse, filter, validate, render and post a single item.
    async fn handle_item(&mut self, item: QueueItem) -> IterationOutcome {
        let event = match parse(&item.payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    queue = %item.source_queue,
                    error = %e,
                    preview = %raw_preview(&item.payload),
                    "Discarding malformed payload"
                );
                self.stats.discarded += 1;
                return IterationOutcome::Malformed {
                    reason: e.to_string(),
                };
            }
        };

        let kind = classify(&event);
        if !self.config.profile.handles(kind) {
            debug!(kind = %kind, profile = %self.config.profile, "Skipping event for another profile");
            self.stats.discarded += 1;
            return IterationOutcome::Skipped { kind };
        }

        let preview = event.preview(PREVIEW_CHARS);
        info!(
            kind = %kind,
            queue = %item.source_queue,
            queue_id = event.queue_id.as_deref().unwrap_or_default(),
            preview = %preview,
            "Processing event"
        );

        if let Err(e) = validate(&event) {
            warn!(kind = %kind, preview = %preview, field = e.field, "Invalid event, discarding");
            return self.reject(kind, e.to_string());
        }

        let content = match self.renderer.render(&event, &self.template) {
            Ok(content) => content,
            Err(e) => {
                warn!(kind = %kind, preview = %preview, error = %e, "Render failed, discarding");
                return self.reject(kind, e.to_string());
            }
        };

        let delivery = self.policy.submit(self.gateway.as_ref(), &content).await;
        let content_preview: String = delivery.content.chars().take(PREVIEW_CHARS).collect();

        match delivery.outcome {
            PostOutcome::Success(post) => {
                self.state.record_success();
                self.stats.posted += 1;
                info!(
                    kind = %kind,
                    post_id = %post.id,
                    url = %post.url,
                    attempts = delivery.attempts,
                    preview = %content_preview,
                    "Post published"
                );
                IterationOutcome::Posted { kind, post }
            }
            outcome => {
                self.state.record_failure();
                self.stats.failed += 1;
                warn!(
                    kind = %kind,
                    reason = %outcome,
                    attempts = delivery.attempts,
                    consecutive_failures = self.state.consecutive_failures(),
                    preview = %content_preview,
                    "Post failed"
                );
                IterationOutcome::Failed { kind, outcome }
            }
        }
    }

    fn reject(&mut self, kind: EventKind, reason: String) -> IterationOutcome {
        self.state.record_failure();
        self.stats.invalid += 1;
        debug!(
            consecutive_failures = self.state.consecutive_failures(),
            "Invalid event counted as failure"
        );
        IterationOutcome::Invalid { kind, reason }
    }

    async fn cooldown(&mut self) {
        warn!(
            consecutive_failures = self.state.consecutive_failures(),
            cooldown_secs = self.config.cooldown.as_secs(),
            "Too many consecutive failures, cooling down"
        );
        self.stats.cooldowns += 1;
        self.pause(self.config.cooldown).await;
        self.state.reset_failures();
        info!("Cooldown finished, resuming");
    }

    /// Back off and reconnect until it works or shutdown fires. Returns
    /// whether the queue is usable again.
    pub(crate) async fn recover_transport(&mut self) -> bool {
        loop {
            warn!(
                backoff_secs = self.config.reconnect_backoff.as_secs(),
                "Waiting before reconnecting to queue"
            );
            if !self.pause(self.config.reconnect_backoff).await {
                return false;
            }

            match self.queue.reconnect().await {
                Ok(()) => {
                    self.state.reset_failures();
                    self.stats.reconnects += 1;
                    info!("Reconnected to queue");
                    return true;
                }
                Err(e) => {
                    error!(error = %e, "Failed to reconnect to queue");
                }
            }
        }
    }

    /// Shutdown-aware sleep. Returns `false` if cut short.
    async fn pause(&mut self, duration: std::time::Duration) -> bool {
        self.shutdown.sleep(duration).await
    }
}

fn raw_preview(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload)
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}
