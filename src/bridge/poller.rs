//! Inbound poll engine: watermark, single-flight, dedup, rate limiting.
//!
//! [`PollEngine::run`] is a cooperative recurring loop: an awaited
//! interval re-arms the schedule after every cycle, successful or not.
//! [`PollEngine::run_cycle`] does the work of one tick and is safe to
//! invoke from anywhere: a cycle already in flight turns the new
//! invocation into a logged no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::bridge::connection::ConnectionGuard;
use crate::bridge::dispatch::DispatchSink;
use crate::ntfy::{NtfyClient, NtfyError, NtfyMessage};

/// Current unix time in seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Source of inbound notifications, keyed by a since-timestamp.
///
/// Implemented by [`NtfyClient`]; tests substitute scripted sources.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Fetch all messages published strictly after `since` (unix seconds).
    ///
    /// Scheduled messages are excluded unless `include_scheduled` is set.
    ///
    /// # Errors
    ///
    /// Returns [`NtfyError`] on transport failure or server rejection.
    async fn fetch_messages(
        &self,
        since: f64,
        include_scheduled: bool,
    ) -> Result<Vec<NtfyMessage>, NtfyError>;
}

#[async_trait]
impl NotificationSource for NtfyClient {
    async fn fetch_messages(
        &self,
        since: f64,
        include_scheduled: bool,
    ) -> Result<Vec<NtfyMessage>, NtfyError> {
        NtfyClient::fetch_messages(self, since, include_scheduled).await
    }
}

/// Recurring inbound poller.
///
/// Owns the watermark and the two lifecycle flags. All mutation happens on
/// the engine's own execution path; the watermark mutex is never held
/// across an await point.
pub struct PollEngine {
    source: Arc<dyn NotificationSource>,
    sink: Arc<dyn DispatchSink>,
    connection: Arc<ConnectionGuard>,
    dispatch_delay: Duration,
    running: AtomicBool,
    in_flight: AtomicBool,
    watermark: Mutex<f64>,
}

impl PollEngine {
    /// Create an engine with the watermark set to the current time, so
    /// only messages published after process start are delivered.
    pub fn new(
        source: Arc<dyn NotificationSource>,
        sink: Arc<dyn DispatchSink>,
        connection: Arc<ConnectionGuard>,
        dispatch_delay: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            connection,
            dispatch_delay,
            running: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            watermark: Mutex::new(unix_now()),
        }
    }

    /// Mark the engine running. Returns `false` if it already was.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("poll engine already running, ignoring start");
            return false;
        }
        info!("poll engine started");
        true
    }

    /// Mark the engine stopped. Prevents new cycles; a cycle already in
    /// flight is not interrupted.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        info!("poll engine stopped");
    }

    /// Whether the engine is accepting new cycles.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Current watermark (unix seconds). Messages at or before this time
    /// are considered processed.
    pub fn watermark(&self) -> f64 {
        self.watermark.lock().map(|w| *w).unwrap_or(0.0)
    }

    /// Advance the watermark, never letting it decrease.
    fn advance_watermark(&self, to: f64) {
        if let Ok(mut watermark) = self.watermark.lock() {
            if to > *watermark {
                *watermark = to;
            }
        }
    }

    /// Run the recurring poll loop until the shutdown signal fires.
    ///
    /// The first immediate interval tick is skipped; after that each tick
    /// invokes [`PollEngine::run_cycle`], and the awaited interval re-arms
    /// the schedule regardless of how the cycle ended.
    pub async fn run(&self, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "poller loop started");

        let mut ticker = tokio::time::interval(interval);
        // Skip the first immediate tick.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("poller loop shutting down");
                        break;
                    }
                }
            }
        }

        info!("poller loop stopped");
    }

    /// Execute one poll cycle.
    ///
    /// No-op when the engine is not running or a cycle is already in
    /// flight. The in-flight flag is cleared on every exit path (empty
    /// batch, fetch error, normal completion), so a single failure can
    /// never stall the schedule.
    pub async fn run_cycle(&self) {
        if !self.running.load(Ordering::Acquire) {
            warn!("poll engine not running, skipping cycle");
            return;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("previous poll cycle still in flight, skipping");
            return;
        }

        self.connection.ensure_connection().await;

        let since = self.watermark();
        match self.source.fetch_messages(since, false).await {
            Ok(batch) if batch.is_empty() => {
                debug!(since, "no new messages");
            }
            Ok(batch) => {
                self.process_batch(batch).await;
            }
            Err(e) => {
                error!(error = %e, "poll fetch failed");
            }
        }

        self.in_flight.store(false, Ordering::Release);
    }

    /// Deliver one batch: ascending timestamp order, adjacent duplicates
    /// skipped, watermark advanced per accepted message, deliveries paced
    /// by the dispatch delay.
    async fn process_batch(&self, mut batch: Vec<NtfyMessage>) {
        batch.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut last_body: Option<String> = None;
        for message in batch {
            let body = message.body().to_owned();
            if last_body.as_deref() == Some(body.as_str()) {
                info!(body = %body, "duplicate of previous message, skipping");
                continue;
            }

            self.advance_watermark(message.time);
            last_body = Some(body.clone());

            // Pace deliveries so the chat sink is not flooded.
            tokio::time::sleep(self.dispatch_delay).await;
            let text = format!("发送者:{}\nmessage:{}", message.sender_id(), body);
            self.sink.emit(text).await;
        }
    }
}
