//! # beacon-core
//!
//! Foundation types for the Beacon telemetry queue.
//!
//! This crate provides the shared vocabulary that the settings and queue
//! crates depend on:
//!
//! - **Events**: [`EventRecord`], an immutable reportable event with a name,
//!   typed properties, a construction timestamp, and optional enrichment
//! - **Properties**: [`PropertyValue`] tagged union (bool/int/float/string/map)
//! - **Flush reasons**: [`FlushReason`] diagnostics tag attached to each batch
//! - **Branded IDs**: [`EventId`], [`BatchId`] as newtypes for type safety
//! - **Identifiers**: [`IdentifierProvider`] collaborator contract and
//!   [`TrackingStatus`]
//! - **Errors**: [`CoreError`] via `thiserror`
//! - **Logging**: `tracing` subscriber bootstrap and test capture

#![deny(unsafe_code)]

pub mod errors;
pub mod event;
pub mod flush;
pub mod identity;
pub mod ids;
pub mod logging;
pub mod property;

pub use errors::{CoreError, Result};
pub use event::{EventRecord, EventRecordBuilder};
pub use flush::FlushReason;
pub use identity::{Enrichment, IdentifierProvider, StaticIdentifiers, TrackingStatus};
pub use ids::{BatchId, EventId};
pub use property::{Properties, PropertyValue};
