//! Queue error types.

use beacon_core::CoreError;
use thiserror::Error;

/// Errors surfaced by queue operations.
///
/// Delivery failures never appear here: a batch the sender cannot take is
/// logged and dropped.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue has been shut down and accepts no more events.
    #[error("event queue is shut down")]
    Closed,
    /// The event failed validation and was not enqueued.
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] CoreError),
    /// A process-wide queue is already installed.
    #[error("an event queue is already installed")]
    AlreadyInstalled,
    /// No process-wide queue is installed.
    #[error("no event queue is installed")]
    NotInstalled,
}
