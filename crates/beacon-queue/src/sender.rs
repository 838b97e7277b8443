//! Sender contract.
//!
//! The queue hands every drained batch to an [`EventSender`] and moves on.
//! Senders must not block. They run on the flushing thread after the queue
//! lock is released, so calling back into the queue is allowed; an event
//! added from inside `send` lands in the fresh buffer, and if it reaches the
//! threshold the sender is invoked again before the outer call returns.
//! Whatever a sender cannot take is reported as a [`SendOutcome`] and
//! dropped by the queue; there is no retry.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::batch::FlushBatch;

/// Result of handing a batch to a sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The sender took ownership of the batch.
    Accepted,
    /// The sender cannot transmit right now (no network, bad config).
    Unavailable(String),
    /// The sender discarded the batch (e.g. its own buffer is full).
    Dropped(String),
}

impl SendOutcome {
    /// Whether the batch was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Takes flushed batches off the queue's hands.
#[cfg_attr(test, mockall::automock)]
pub trait EventSender: Send + Sync {
    /// Take a batch. Must return promptly.
    fn send(&self, batch: FlushBatch) -> SendOutcome;
}

impl<F> EventSender for F
where
    F: Fn(FlushBatch) -> SendOutcome + Send + Sync,
{
    fn send(&self, batch: FlushBatch) -> SendOutcome {
        self(batch)
    }
}

/// Forwards batches to a bounded channel read by a transport task.
///
/// Never blocks: a full channel drops the batch.
#[derive(Clone, Debug)]
pub struct ChannelSender {
    tx: mpsc::Sender<FlushBatch>,
}

impl ChannelSender {
    /// Create a sender and the receiver the transport task should drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<FlushBatch>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl EventSender for ChannelSender {
    fn send(&self, batch: FlushBatch) -> SendOutcome {
        match self.tx.try_send(batch) {
            Ok(()) => SendOutcome::Accepted,
            Err(TrySendError::Full(batch)) => SendOutcome::Dropped(format!(
                "transport channel full, {} events discarded",
                batch.len()
            )),
            Err(TrySendError::Closed(_)) => {
                SendOutcome::Unavailable("transport channel closed".to_string())
            }
        }
    }
}
