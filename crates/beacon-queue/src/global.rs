//! Process-wide queue slot.
//!
//! SDK entry points that have no handle to pass around (platform callbacks,
//! FFI shims) reach the session's queue through here. Installing is
//! explicit and happens once per session; [`teardown`] shuts the queue down
//! and empties the slot so a new session can install its own.

use std::sync::Arc;

use beacon_core::{EventRecord, FlushReason};
use parking_lot::RwLock;
use tracing::debug;

use crate::errors::QueueError;
use crate::queue::EventQueue;

static CURRENT: RwLock<Option<Arc<EventQueue>>> = parking_lot::const_rwlock(None);

/// Install `queue` as the process-wide queue.
pub fn install(queue: EventQueue) -> Result<Arc<EventQueue>, QueueError> {
    let mut slot = CURRENT.write();
    if slot.is_some() {
        return Err(QueueError::AlreadyInstalled);
    }
    let queue = Arc::new(queue);
    *slot = Some(Arc::clone(&queue));
    debug!("event queue installed");
    Ok(queue)
}

/// The installed queue, if any.
pub fn current() -> Option<Arc<EventQueue>> {
    CURRENT.read().clone()
}

/// Add an event to the installed queue.
pub fn add_event(event: EventRecord) -> Result<(), QueueError> {
    current().ok_or(QueueError::NotInstalled)?.add_event(event)
}

/// Flush the installed queue.
pub fn flush(reason: FlushReason) -> Result<(), QueueError> {
    current().ok_or(QueueError::NotInstalled)?.flush(reason);
    Ok(())
}

/// Shut down and remove the installed queue.
///
/// Returns `false` if nothing was installed.
pub fn teardown() -> bool {
    let Some(queue) = CURRENT.write().take() else {
        return false;
    };
    queue.shutdown();
    debug!("event queue torn down");
    true
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    use super::*;
    use crate::batch::FlushBatch;
    use crate::config::QueueConfig;
    use crate::sender::{EventSender, SendOutcome};

    // The slot is process-wide, so every step lives in one test.
    #[tokio::test]
    async fn install_use_teardown() {
        let batches: Arc<Mutex<Vec<FlushBatch>>> = Arc::default();
        let sink = Arc::clone(&batches);
        let sender: Arc<dyn EventSender> = Arc::new(move |batch: FlushBatch| {
            sink.lock().push(batch);
            SendOutcome::Accepted
        });
        let config = QueueConfig {
            flush_threshold: 10,
            flush_interval: Duration::from_secs(3600),
            log_interval: None,
        };

        assert!(current().is_none());
        assert_matches!(
            add_event(EventRecord::new("early").unwrap()),
            Err(QueueError::NotInstalled)
        );
        assert!(!teardown());

        let queue = install(EventQueue::new(config.clone(), Arc::clone(&sender))).unwrap();
        assert_matches!(
            install(EventQueue::new(config.clone(), Arc::clone(&sender))),
            Err(QueueError::AlreadyInstalled)
        );

        add_event(EventRecord::new("A").unwrap()).unwrap();
        flush(FlushReason::ForcedFlush).unwrap();
        add_event(EventRecord::new("B").unwrap()).unwrap();

        assert!(teardown());
        assert!(queue.is_closed());
        assert!(current().is_none());

        let reasons: Vec<_> = batches.lock().iter().map(|b| b.reason).collect();
        assert_eq!(reasons, vec![FlushReason::ForcedFlush, FlushReason::ForcedFlush]);
        assert_eq!(batches.lock()[1].names(), vec!["B"]);

        let _ = install(EventQueue::new(config, sender)).unwrap();
        assert!(teardown());
    }
}
