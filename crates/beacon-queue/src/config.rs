//! Effective queue configuration.
//!
//! [`QueueSettings`] holds what the user wrote; [`QueueConfig`] is what the
//! queue runs with. Resolution never fails: absent or non-positive values
//! become the defaults.

use std::time::Duration;

use beacon_settings::QueueSettings;
use tracing::warn;

/// Default timer flush period.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(15);

/// Default threshold flush size.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;

/// Longest accepted flush or log interval. Longer values are clamped.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Sanitized queue configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// Period of the flush timer. Always non-zero.
    pub flush_interval: Duration,
    /// Events per threshold flush. Always at least 1.
    pub flush_threshold: usize,
    /// Period of the status log timer, if enabled.
    pub log_interval: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            log_interval: None,
        }
    }
}

impl QueueConfig {
    /// Build a config from optional user settings.
    pub fn resolve(settings: Option<&QueueSettings>) -> Self {
        let Some(settings) = settings else {
            return Self::default();
        };

        let flush_interval = match positive(settings.flush_interval_secs) {
            Some(secs) => Duration::from_secs(secs),
            None => {
                warn!(
                    value = settings.flush_interval_secs,
                    default_secs = DEFAULT_FLUSH_INTERVAL.as_secs(),
                    "invalid flush interval, using default"
                );
                DEFAULT_FLUSH_INTERVAL
            }
        };

        let flush_threshold = match positive(settings.flush_threshold)
            .and_then(|n| usize::try_from(n).ok())
        {
            Some(n) => n,
            None => {
                warn!(
                    value = settings.flush_threshold,
                    default = DEFAULT_FLUSH_THRESHOLD,
                    "invalid flush threshold, using default"
                );
                DEFAULT_FLUSH_THRESHOLD
            }
        };

        let log_interval = settings
            .log_interval_secs
            .and_then(positive)
            .map(Duration::from_secs);

        Self {
            flush_interval,
            flush_threshold,
            log_interval,
        }
        .sanitized()
    }

    /// Replace zero values with defaults and clamp intervals to
    /// [`MAX_INTERVAL`].
    ///
    /// Applied to configs built by hand so a zero threshold or interval can
    /// never disable flushing.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.flush_interval.is_zero() {
            warn!("zero flush interval, using default");
            self.flush_interval = DEFAULT_FLUSH_INTERVAL;
        }
        if self.flush_threshold == 0 {
            warn!("zero flush threshold, using default");
            self.flush_threshold = DEFAULT_FLUSH_THRESHOLD;
        }
        if self.flush_interval > MAX_INTERVAL {
            warn!(
                value_secs = self.flush_interval.as_secs(),
                max_secs = MAX_INTERVAL.as_secs(),
                "flush interval too long, clamping"
            );
            self.flush_interval = MAX_INTERVAL;
        }
        self.log_interval = self
            .log_interval
            .filter(|d| !d.is_zero())
            .map(|d| d.min(MAX_INTERVAL));
        self
    }
}

fn positive(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}
