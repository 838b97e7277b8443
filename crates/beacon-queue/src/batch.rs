//! Drained batches handed to a sender.

use beacon_core::{BatchId, EventRecord, FlushReason};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Events drained by one flush, in the order they were added.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushBatch {
    /// Batch identifier.
    pub id: BatchId,
    /// Per-queue flush number, starting at 1. Assigned while the buffer lock
    /// is held, so it reflects drain order.
    pub sequence: u64,
    /// What triggered the flush.
    pub reason: FlushReason,
    /// When the buffer was drained.
    pub flushed_at: DateTime<Utc>,
    /// Drained events, oldest first.
    pub events: Vec<EventRecord>,
}

impl FlushBatch {
    pub(crate) fn new(sequence: u64, reason: FlushReason, events: Vec<EventRecord>) -> Self {
        Self {
            id: BatchId::new(),
            sequence,
            reason,
            flushed_at: Utc::now(),
            events,
        }
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch carries no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event names in batch order.
    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(EventRecord::name).collect()
    }
}
