//! # beacon-settings
//!
//! Configuration for the Beacon telemetry queue.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`BeaconSettings::default()`]
//! 2. **User file**: `~/.beacon/settings.json`, deep-merged over defaults
//! 3. **Environment variables**: `BEACON_*` overrides (highest priority)
//!
//! Values are stored as written; sanitizing non-positive intervals and
//! thresholds happens where the queue consumes them.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<BeaconSettings> = OnceLock::new();

/// Get the process-wide settings.
///
/// Loaded on first call; any load error falls back to compiled defaults.
pub fn get_settings() -> &'static BeaconSettings {
    SETTINGS.get_or_init(|| match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            BeaconSettings::default()
        }
    })
}

/// Initialize the process-wide settings with a specific value.
///
/// Returns the settings back if they were already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: BeaconSettings) -> std::result::Result<(), BeaconSettings> {
    SETTINGS.set(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_get_returns_same_value() {
        let custom = BeaconSettings {
            app_id: Some("from-test".to_string()),
            ..BeaconSettings::default()
        };
        assert!(init_settings(custom.clone()).is_ok());
        assert_eq!(get_settings(), &custom);
        assert!(init_settings(BeaconSettings::default()).is_err());
    }
}
