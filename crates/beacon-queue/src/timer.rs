//! Timer tasks driving periodic flushes and status logging.
//!
//! Each queue owns one flush timer task and, optionally, one log timer task.
//! The tasks hold only a weak reference to their target, so dropping the
//! queue ends them, and both stop as soon as the shared cancellation token
//! fires.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::MAX_INTERVAL;

/// Receiver of timer ticks.
pub(crate) trait TimerTarget: Send + Sync + 'static {
    /// The flush timer fired at `at`.
    fn on_flush_tick(&self, at: Instant);
    /// The log timer fired.
    fn on_log_tick(&self);
}

/// Handles to a queue's timer tasks.
pub(crate) struct TimerTasks {
    cancel: CancellationToken,
    flush_task: JoinHandle<()>,
    log_task: Option<JoinHandle<()>>,
}

impl TimerTasks {
    /// Spawn the timers on the current Tokio runtime.
    ///
    /// Schedules are anchored at `start`, not at the tasks' first poll: the
    /// first flush tick is due at `start + flush_interval` and fires
    /// immediately if the runtime picks the task up later than that.
    pub(crate) fn spawn<T: TimerTarget>(
        target: &Arc<T>,
        start: Instant,
        flush_interval: Duration,
        log_interval: Option<Duration>,
    ) -> Self {
        let cancel = CancellationToken::new();

        let flush_task = tokio::spawn(run_flush_timer(
            Arc::downgrade(target),
            first_deadline(start, flush_interval),
            flush_interval,
            cancel.clone(),
        ));
        let log_task = log_interval.map(|period| {
            tokio::spawn(run_log_timer(
                Arc::downgrade(target),
                first_deadline(start, period),
                period,
                cancel.clone(),
            ))
        });

        Self {
            cancel,
            flush_task,
            log_task,
        }
    }

    /// Stop both timers. Idempotent.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the timers have been told to stop.
    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether every timer task has exited.
    #[cfg(test)]
    pub(crate) fn tasks_finished(&self) -> bool {
        self.flush_task.is_finished()
            && self.log_task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TimerTasks {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.flush_task.abort();
        if let Some(task) = &self.log_task {
            task.abort();
        }
    }
}

/// `start + period`, saturating far in the future instead of overflowing.
fn first_deadline(start: Instant, period: Duration) -> Instant {
    start
        .checked_add(period)
        .or_else(|| start.checked_add(MAX_INTERVAL))
        .unwrap_or(start)
}

async fn run_flush_timer<T: TimerTarget>(
    target: Weak<T>,
    first: Instant,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else { break };
                // A late tick restarts the schedule from now.
                target.on_flush_tick(Instant::now());
            }
        }
    }
    debug!("flush timer stopped");
}

async fn run_log_timer<T: TimerTarget>(
    target: Weak<T>,
    first: Instant,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(target) = target.upgrade() else { break };
                target.on_log_tick();
            }
        }
    }
}
