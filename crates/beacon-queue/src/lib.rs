//! # beacon-queue
//!
//! Buffered telemetry event queue.
//!
//! Events are appended to an in-memory buffer and handed to an
//! [`EventSender`] in batches. A batch goes out when the buffer reaches the
//! flush threshold, when the periodic timer fires, or when the host asks
//! (explicit flush, lifecycle signal, shutdown).
//!
//! ```text
//! add_event ──► [buffer + countdown] ──threshold──┐
//!                      ▲                          │
//!     flush timer ─────┤                          ├──► FlushBatch ──► EventSender
//!     LifecycleHub ────┤                          │
//!     flush/shutdown ──┴──────────────────────────┘
//! ```
//!
//! - [`EventQueue`]: the queue itself
//! - [`QueueConfig`]: sanitized threshold and intervals
//! - [`EventSender`], [`ChannelSender`]: where batches go
//! - [`LifecycleHub`]: host lifecycle fan-out
//! - [`global`]: optional process-wide slot

#![deny(unsafe_code)]

pub mod batch;
pub mod config;
pub mod errors;
pub mod global;
pub mod lifecycle;
pub mod queue;
pub mod scheduler;
pub mod sender;
mod timer;

pub use batch::FlushBatch;
pub use config::{DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_THRESHOLD, MAX_INTERVAL, QueueConfig};
pub use errors::QueueError;
pub use lifecycle::{LifecycleHub, LifecycleSignal, SubscriptionId};
pub use queue::{EventQueue, QueueSnapshot};
pub use scheduler::{FlushScheduler, ThresholdCountdown};
pub use sender::{ChannelSender, EventSender, SendOutcome};
