//! Settings types.
//!
//! Numeric queue values are signed on purpose: a misconfigured `0` or `-5`
//! must parse so the queue can substitute its default instead of failing the
//! whole load.

use serde::{Deserialize, Serialize};

/// Default flush interval in seconds.
pub const DEFAULT_FLUSH_INTERVAL_SECS: i64 = 15;

/// Default event-count flush threshold.
pub const DEFAULT_FLUSH_THRESHOLD: i64 = 100;

/// Root settings object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeaconSettings {
    /// Collector endpoint that flushed batches are delivered to.
    pub endpoint: String,
    /// Application identifier issued by the collector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Whether events may be enriched with advertising identifiers.
    pub tracking_enabled: bool,
    /// Default `tracing` filter for hosts that let the SDK install a subscriber.
    pub log_level: String,
    /// Event queue settings.
    pub queue: QueueSettings,
}

impl Default for BeaconSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://collector.beacon.dev/v1/batch".to_string(),
            app_id: None,
            tracking_enabled: true,
            log_level: "warn".to_string(),
            queue: QueueSettings::default(),
        }
    }
}

/// Event queue flush settings, as written by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueSettings {
    /// Seconds between timer flushes. Values `<= 0` fall back to the default.
    pub flush_interval_secs: i64,
    /// Events per threshold flush. Values `<= 0` fall back to the default.
    pub flush_threshold: i64,
    /// Seconds between status log lines. Absent or `<= 0` disables them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_interval_secs: Option<i64>,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            log_interval_secs: None,
        }
    }
}
