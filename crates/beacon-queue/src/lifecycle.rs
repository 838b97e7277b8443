//! Host lifecycle signals.
//!
//! Platform glue (an app delegate, a signal handler, a window event loop)
//! calls [`LifecycleHub::emit`]; queues attached to the hub flush with the
//! matching [`FlushReason`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use beacon_core::FlushReason;
use parking_lot::RwLock;

/// A host application lifecycle transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleSignal {
    /// The application moved to the background.
    Backgrounded,
    /// The application returned to the foreground.
    Foregrounded,
}

impl LifecycleSignal {
    /// Flush reason recorded for a flush triggered by this signal.
    pub fn flush_reason(self) -> FlushReason {
        match self {
            Self::Backgrounded => FlushReason::AppBackgrounded,
            Self::Foregrounded => FlushReason::AppForegrounded,
        }
    }
}

/// Handle returned by [`LifecycleHub::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(LifecycleSignal) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<(SubscriptionId, Callback)>>,
}

/// Fan-out point for lifecycle signals. Cheap to clone.
#[derive(Clone, Default)]
pub struct LifecycleHub {
    inner: Arc<HubInner>,
}

impl LifecycleHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future signal.
    pub fn subscribe(
        &self,
        callback: impl Fn(LifecycleSignal) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Deliver a signal to every subscriber, in registration order.
    ///
    /// Callbacks run on the calling thread, outside the hub's lock.
    pub fn emit(&self, signal: LifecycleSignal) {
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .read()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        tracing::debug!(?signal, subscribers = callbacks.len(), "lifecycle signal");
        for callback in callbacks {
            callback(signal);
        }
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }
}
