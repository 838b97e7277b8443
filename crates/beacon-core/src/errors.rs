//! Core error types.

use thiserror::Error;

/// Errors raised while constructing or validating events.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The event name was empty or whitespace-only.
    #[error("event name must not be empty")]
    EmptyEventName,
    /// A property key was empty.
    #[error("property key must not be empty (event {event})")]
    EmptyPropertyKey {
        /// Name of the event carrying the bad key.
        event: String,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
