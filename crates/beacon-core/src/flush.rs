//! Flush reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What triggered a flush.
///
/// Attached to each outgoing batch for diagnostics. Flush behavior is the
/// same for every reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushReason {
    /// The host application moved to the background.
    AppBackgrounded,
    /// The host application returned to the foreground.
    AppForegrounded,
    /// The periodic flush timer fired.
    Timer,
    /// The event-count threshold was reached.
    ThresholdReached,
    /// An explicit flush was requested.
    ForcedFlush,
    /// The buffer grew past a caller-imposed size limit.
    EventQueueSizeExceeded,
}

impl FlushReason {
    /// Every reason, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::AppBackgrounded,
        Self::AppForegrounded,
        Self::Timer,
        Self::ThresholdReached,
        Self::ForcedFlush,
        Self::EventQueueSizeExceeded,
    ];

    /// Stable snake-case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppBackgrounded => "app_backgrounded",
            Self::AppForegrounded => "app_foregrounded",
            Self::Timer => "timer",
            Self::ThresholdReached => "threshold_reached",
            Self::ForcedFlush => "forced_flush",
            Self::EventQueueSizeExceeded => "event_queue_size_exceeded",
        }
    }
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
