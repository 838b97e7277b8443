//! Device identifier collaborator contract.
//!
//! The queue never talks to platform identifier APIs. Event construction
//! code asks an [`IdentifierProvider`] for a snapshot and attaches the
//! resulting [`Enrichment`] to the record before it is enqueued.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Advertising-tracking authorization status.
///
/// Discriminants match the platform status codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined = 0,
    /// Tracking is restricted by device policy.
    Restricted = 1,
    /// The user denied tracking.
    Denied = 2,
    /// The user authorized tracking.
    Authorized = 3,
}

impl TrackingStatus {
    /// Map a platform status code. Unknown codes are treated as not determined.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Restricted,
            2 => Self::Denied,
            3 => Self::Authorized,
            _ => Self::NotDetermined,
        }
    }

    /// Platform status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether advertising identifiers may be collected.
    pub fn is_authorized(self) -> bool {
        self == Self::Authorized
    }
}

/// Identifier fields attached to an event before it is enqueued.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    /// Advertising identifier, present only when tracking is authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertising_id: Option<String>,
    /// Vendor-scoped device identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    /// Hardware model, e.g. `iPhone14,2`.
    pub device_type: String,
    /// User-facing device name.
    pub device_name: String,
    /// Tracking authorization at the time of the snapshot.
    pub tracking_status: TrackingStatus,
    /// Whether tracking was enabled at the time of the snapshot.
    pub tracking_enabled: bool,
}

/// Supplies device and advertising identifiers.
///
/// Implementations wrap platform APIs; the queue only ever sees the
/// [`Enrichment`] produced by [`IdentifierProvider::snapshot`].
pub trait IdentifierProvider: Send + Sync {
    /// Raw advertising identifier, if the platform exposes one.
    fn advertising_id(&self) -> Option<String>;

    /// Vendor-scoped identifier.
    fn vendor_id(&self) -> Option<String>;

    /// Hardware model string.
    fn device_type(&self) -> String;

    /// User-facing device name.
    fn device_name(&self) -> String;

    /// Current tracking authorization.
    fn tracking_status(&self) -> TrackingStatus;

    /// Whether tracking is currently enabled.
    fn tracking_enabled(&self) -> bool {
        self.tracking_status().is_authorized()
    }

    /// Ask the platform for tracking authorization.
    ///
    /// The default reports the current status without prompting.
    fn request_tracking_authorization(&self, completion: Box<dyn FnOnce(TrackingStatus) + Send>) {
        completion(self.tracking_status());
    }

    /// Capture the identifiers to attach to an event.
    ///
    /// The advertising identifier is withheld unless tracking is enabled.
    fn snapshot(&self) -> Enrichment {
        let tracking_status = self.tracking_status();
        let tracking_enabled = self.tracking_enabled();
        Enrichment {
            advertising_id: if tracking_enabled {
                self.advertising_id()
            } else {
                None
            },
            vendor_id: self.vendor_id(),
            device_type: self.device_type(),
            device_name: self.device_name(),
            tracking_status,
            tracking_enabled,
        }
    }
}

/// Fixed-value provider for hosts without a platform identifier API.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentifiers {
    /// Advertising identifier to report.
    pub advertising_id: Option<String>,
    /// Vendor identifier to report.
    pub vendor_id: Option<String>,
    /// Device model to report.
    pub device_type: String,
    /// Device name to report.
    pub device_name: String,
    /// Authorization status to report.
    pub tracking_status: TrackingStatus,
}

impl StaticIdentifiers {
    /// Provider reporting the local OS/arch as device type and a fresh
    /// vendor identifier.
    pub fn local() -> Self {
        Self {
            advertising_id: None,
            vendor_id: Some(new_device_id()),
            device_type: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            device_name: std::env::consts::OS.to_string(),
            tracking_status: TrackingStatus::NotDetermined,
        }
    }
}

impl IdentifierProvider for StaticIdentifiers {
    fn advertising_id(&self) -> Option<String> {
        self.advertising_id.clone()
    }

    fn vendor_id(&self) -> Option<String> {
        self.vendor_id.clone()
    }

    fn device_type(&self) -> String {
        self.device_type.clone()
    }

    fn device_name(&self) -> String {
        self.device_name.clone()
    }

    fn tracking_status(&self) -> TrackingStatus {
        self.tracking_status
    }
}

/// Generate a random identifier for first-launch device IDs.
pub fn new_device_id() -> String {
    Uuid::new_v4().to_string()
}
