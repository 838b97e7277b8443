//! The event queue.
//!
//! [`EventQueue`] buffers [`EventRecord`]s and hands them to an
//! [`EventSender`] in batches.
//!
//! # Flush triggers
//!
//! - **Threshold**: the Nth [`EventQueue::add_event`] since the last flush
//!   drains the buffer before returning.
//! - **Timer**: a background task flushes every interval, empty or not. The
//!   schedule follows previous fires and is not moved by other flushes.
//! - **Explicit**: [`EventQueue::flush`] with any [`FlushReason`], including
//!   lifecycle signals delivered through a [`LifecycleHub`].
//!
//! # Consistency
//!
//! The buffer, the threshold countdown, and the closed flag share one lock.
//! A flush swaps the buffer out and resets the countdown in a single
//! critical section, then calls the sender after the lock is released.
//! Events added while the sender runs land in the fresh buffer.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::{EventRecord, FlushReason};
use beacon_settings::QueueSettings;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::batch::FlushBatch;
use crate::config::QueueConfig;
use crate::errors::QueueError;
use crate::lifecycle::{LifecycleHub, SubscriptionId};
use crate::scheduler::FlushScheduler;
use crate::sender::{EventSender, SendOutcome};
use crate::timer::{TimerTarget, TimerTasks};

/// Point-in-time view of queue state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Events waiting for the next flush.
    pub pending: usize,
    /// Events left before the threshold flush.
    pub remaining_until_threshold: usize,
    /// Configured threshold.
    pub threshold: usize,
    /// Time until the next timer flush.
    pub time_until_flush: Duration,
    /// Flushes performed so far.
    pub flushes: u64,
    /// Reason of the most recent flush.
    pub last_flush_reason: Option<FlushReason>,
    /// Whether the queue has been shut down.
    pub closed: bool,
}

struct QueueState {
    buffer: Vec<EventRecord>,
    scheduler: FlushScheduler,
    flushes: u64,
    last_flush_reason: Option<FlushReason>,
    closed: bool,
}

impl QueueState {
    fn drain(&mut self, reason: FlushReason) -> FlushBatch {
        let events = std::mem::take(&mut self.buffer);
        self.scheduler.on_flush();
        self.flushes += 1;
        self.last_flush_reason = Some(reason);
        FlushBatch::new(self.flushes, reason, events)
    }
}

/// State shared between the queue handle, its timer tasks, and lifecycle
/// callbacks.
struct QueueShared {
    state: Mutex<QueueState>,
    sender: Arc<dyn EventSender>,
}

impl QueueShared {
    fn add_event(&self, event: EventRecord) -> Result<(), QueueError> {
        event.validate()?;

        let batch = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(QueueError::Closed);
            }
            trace!(event = event.name(), "event enqueued");
            state.buffer.push(event);
            state.scheduler.record_event().map(|reason| {
                debug!(threshold = state.scheduler.threshold(), "flush threshold reached");
                state.drain(reason)
            })
        };

        if let Some(batch) = batch {
            self.dispatch(batch);
        }
        Ok(())
    }

    fn flush(&self, reason: FlushReason) {
        let batch = {
            let mut state = self.state.lock();
            if state.closed {
                debug!(%reason, "flush ignored, queue is shut down");
                return;
            }
            state.drain(reason)
        };
        self.dispatch(batch);
    }

    /// Mark the queue closed and drain what is left.
    fn close(&self) -> Option<FlushBatch> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.closed = true;
        Some(state.drain(FlushReason::ForcedFlush))
    }

    fn dispatch(&self, batch: FlushBatch) {
        let batch_id = batch.id.clone();
        let reason = batch.reason;
        let event_count = batch.len();

        match self.sender.send(batch) {
            SendOutcome::Accepted => {
                debug!(%batch_id, %reason, event_count, "batch handed to sender");
            }
            SendOutcome::Unavailable(cause) | SendOutcome::Dropped(cause) => {
                warn!(%batch_id, %reason, event_count, %cause, "sender refused batch, dropping");
            }
        }
    }

    fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock();
        QueueSnapshot {
            pending: state.buffer.len(),
            remaining_until_threshold: state.scheduler.remaining(),
            threshold: state.scheduler.threshold(),
            time_until_flush: state.scheduler.time_until_flush(Instant::now()),
            flushes: state.flushes,
            last_flush_reason: state.last_flush_reason,
            closed: state.closed,
        }
    }
}

impl TimerTarget for QueueShared {
    fn on_flush_tick(&self, at: Instant) {
        let batch = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.scheduler.record_timer_fire(at);
            state.drain(FlushReason::Timer)
        };
        debug!(event_count = batch.len(), "flush timer fired");
        self.dispatch(batch);
    }

    fn on_log_tick(&self) {
        let snapshot = self.snapshot();
        debug!(
            pending = snapshot.pending,
            remaining = snapshot.remaining_until_threshold,
            seconds_until_flush = snapshot.time_until_flush.as_secs(),
            "event queue status"
        );
    }
}

/// Buffered event queue with threshold and timer flushing.
///
/// One instance per SDK session. Construction starts the timer tasks on the
/// current Tokio runtime; [`EventQueue::shutdown`] or dropping the queue
/// stops them.
pub struct EventQueue {
    shared: Arc<QueueShared>,
    timers: TimerTasks,
    config: QueueConfig,
    attachments: Mutex<Vec<(LifecycleHub, SubscriptionId)>>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EventQueue {
    /// Create a queue and start its timers.
    ///
    /// Zero thresholds and intervals are replaced with defaults.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: QueueConfig, sender: Arc<dyn EventSender>) -> Self {
        let config = config.sanitized();
        let started = Instant::now();

        let shared = Arc::new(QueueShared {
            state: Mutex::new(QueueState {
                buffer: Vec::new(),
                scheduler: FlushScheduler::new(&config, started),
                flushes: 0,
                last_flush_reason: None,
                closed: false,
            }),
            sender,
        });
        let timers = TimerTasks::spawn(
            &shared,
            started,
            config.flush_interval,
            config.log_interval,
        );

        debug!(
            threshold = config.flush_threshold,
            interval_secs = config.flush_interval.as_secs(),
            log_timer = config.log_interval.is_some(),
            "event queue started"
        );

        Self {
            shared,
            timers,
            config,
            attachments: Mutex::new(Vec::new()),
        }
    }

    /// Create a queue from optional user settings, falling back to defaults.
    pub fn from_settings(settings: Option<&QueueSettings>, sender: Arc<dyn EventSender>) -> Self {
        Self::new(QueueConfig::resolve(settings), sender)
    }

    /// Append an event, flushing first if this reaches the threshold.
    ///
    /// Invalid events and events added after shutdown are rejected without
    /// touching the buffer or the countdown.
    pub fn add_event(&self, event: EventRecord) -> Result<(), QueueError> {
        self.shared
            .add_event(event)
            .inspect_err(|e| warn!(error = %e, "event rejected"))
    }

    /// Drain the buffer and hand it to the sender.
    ///
    /// Always hands over a batch, even an empty one. Ignored after shutdown.
    pub fn flush(&self, reason: FlushReason) {
        self.shared.flush(reason);
    }

    /// Current state of the buffer and triggers.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.shared.snapshot()
    }

    /// The configuration the queue is running with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Flush on every signal emitted by `hub`.
    ///
    /// The subscription holds a weak reference and is removed on shutdown
    /// or drop.
    pub fn attach_lifecycle(&self, hub: &LifecycleHub) {
        let weak = Arc::downgrade(&self.shared);
        let id = hub.subscribe(move |signal| {
            if let Some(shared) = weak.upgrade() {
                shared.flush(signal.flush_reason());
            }
        });
        self.attachments.lock().push((hub.clone(), id));
    }

    /// Stop the queue.
    ///
    /// Rejects further events, stops the timers, and drains what is left
    /// with [`FlushReason::ForcedFlush`]. A flush already running on another
    /// thread completes. Idempotent.
    pub fn shutdown(&self) {
        let remaining = self.shared.close();
        self.timers.cancel();
        self.detach_lifecycle();

        if let Some(batch) = remaining {
            info!(event_count = batch.len(), "event queue shutting down");
            self.shared.dispatch(batch);
        }
    }

    fn detach_lifecycle(&self) {
        for (hub, id) in self.attachments.lock().drain(..) {
            let _ = hub.unsubscribe(id);
        }
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        self.detach_lifecycle();
    }
}
