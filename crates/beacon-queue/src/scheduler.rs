//! Flush trigger bookkeeping.
//!
//! [`FlushScheduler`] tracks both flush triggers: the event-count countdown
//! and the position of the periodic timer. It lives inside the queue's
//! locked state so a flush resets the countdown in the same critical
//! section that drains the buffer. The timer itself runs as a separate task
//! (see `timer`) and only reports fires here.

use std::time::Duration;

use beacon_core::FlushReason;
use tokio::time::Instant;

use crate::config::QueueConfig;

/// Countdown from the flush threshold to zero.
///
/// Holds `0 <= remaining <= threshold`. Zero is only observable between a
/// [`tick`](Self::tick) that returns `true` and the following
/// [`reset`](Self::reset).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdCountdown {
    threshold: usize,
    remaining: usize,
}

impl ThresholdCountdown {
    /// Start a countdown. A zero threshold is raised to 1.
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            threshold,
            remaining: threshold,
        }
    }

    /// Count one event. Returns `true` when the countdown reaches zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    /// Restart from the threshold.
    pub fn reset(&mut self) {
        self.remaining = self.threshold;
    }

    /// Events left before the threshold flush.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Configured threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// State of both flush triggers for one queue.
#[derive(Debug)]
pub struct FlushScheduler {
    countdown: ThresholdCountdown,
    interval: Duration,
    last_timer_fire: Instant,
}

impl FlushScheduler {
    /// Create scheduler state with the timer schedule anchored at `start`.
    pub fn new(config: &QueueConfig, start: Instant) -> Self {
        Self {
            countdown: ThresholdCountdown::new(config.flush_threshold),
            interval: config.flush_interval,
            last_timer_fire: start,
        }
    }

    /// Count an enqueued event. Returns the flush reason when the
    /// threshold is reached.
    pub fn record_event(&mut self) -> Option<FlushReason> {
        self.countdown
            .tick()
            .then_some(FlushReason::ThresholdReached)
    }

    /// Note a timer fire. The schedule follows fires, not flushes.
    pub fn record_timer_fire(&mut self, at: Instant) {
        self.last_timer_fire = at;
    }

    /// Reset after any flush. The timer position is left alone.
    pub fn on_flush(&mut self) {
        self.countdown.reset();
    }

    /// Events left before the threshold flush.
    pub fn remaining(&self) -> usize {
        self.countdown.remaining()
    }

    /// Configured threshold.
    pub fn threshold(&self) -> usize {
        self.countdown.threshold()
    }

    /// Time until the next scheduled timer fire, as of `now`.
    pub fn time_until_flush(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_timer_fire))
    }
}
