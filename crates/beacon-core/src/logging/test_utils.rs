//! In-memory capture of tracing events for test assertions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded tracing event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Emitting module path.
    pub target: String,
    /// Rendered message.
    pub message: String,
    /// Structured fields, values rendered with `Display` or `Debug`.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a recorded field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared handle to the events captured so far.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Copy of every captured event, oldest first.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Whether any event at `level` has a message containing `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    /// Events whose message contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.message.contains(needle))
            .cloned()
            .collect()
    }

    /// Number of events at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.events.lock().iter().filter(|e| e.level == level).count()
    }
}

#[derive(Default)]
struct Recorder {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Recorder {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            let _ = self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

struct CaptureLayer {
    sink: CapturedLogs,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);

        let metadata = event.metadata();
        self.sink.events.lock().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            message: recorder.message,
            fields: recorder.fields,
        });
    }
}

/// Capture every event emitted on the current thread, at all levels.
///
/// Capture stops when the returned guard is dropped.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let guard = tracing_subscriber::registry()
        .with(CaptureLayer { sink: logs.clone() })
        .with(LevelFilter::TRACE)
        .set_default();
    (logs, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_level_and_message() {
        let (logs, _guard) = capture_logs();
        tracing::warn!("batch dropped");
        tracing::trace!("event enqueued");

        assert!(logs.has_event(Level::WARN, "batch dropped"));
        assert!(!logs.has_event(Level::DEBUG, "batch dropped"));
        assert_eq!(logs.count_at_level(Level::TRACE), 1);
        assert_eq!(logs.events().len(), 2);
    }

    #[test]
    fn records_structured_fields() {
        let (logs, _guard) = capture_logs();
        let cause = "offline";
        tracing::debug!(reason = "timer", event_count = 3_u64, %cause, closed = false, "flushed");

        let flushed = logs.matching("flushed");
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].field("reason"), Some("timer"));
        assert_eq!(flushed[0].field("event_count"), Some("3"));
        assert_eq!(flushed[0].field("cause"), Some("offline"));
        assert_eq!(flushed[0].field("closed"), Some("false"));
        assert_eq!(flushed[0].field("missing"), None);
    }

    #[test]
    fn capture_ends_with_guard() {
        let (logs, guard) = capture_logs();
        drop(guard);
        tracing::warn!("after");
        assert!(logs.events().is_empty());
    }
}
