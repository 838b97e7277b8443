//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`BeaconSettings::default()`]
//! 2. If `~/.beacon/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `BEACON_*` environment variable overrides (highest priority)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::BeaconSettings;

/// Resolve the path to the settings file (`~/.beacon/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".beacon").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<BeaconSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<BeaconSettings> {
    let defaults = serde_json::to_value(BeaconSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: BeaconSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// Objects merge per key, everything else is replaced by `source`, and
/// `null` in `source` keeps the target value.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `BEACON_*` overrides read through `lookup`.
///
/// Unparseable values are ignored with a warning.
pub fn apply_overrides(settings: &mut BeaconSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("BEACON_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = read("BEACON_APP_ID") {
        settings.app_id = Some(v);
    }
    if let Some(v) = read("BEACON_LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = read("BEACON_TRACKING_ENABLED") {
        match parse_bool(&v) {
            Some(b) => settings.tracking_enabled = b,
            None => warn!(key = "BEACON_TRACKING_ENABLED", value = %v, "invalid boolean env var, ignoring"),
        }
    }

    let read_i64 = |name: &str, slot: &mut i64| {
        if let Some(v) = read(name) {
            match v.trim().parse() {
                Ok(n) => *slot = n,
                Err(_) => warn!(key = name, value = %v, "invalid integer env var, ignoring"),
            }
        }
    };
    read_i64("BEACON_FLUSH_INTERVAL_SECS", &mut settings.queue.flush_interval_secs);
    read_i64("BEACON_FLUSH_THRESHOLD", &mut settings.queue.flush_threshold);

    if let Some(v) = read("BEACON_LOG_INTERVAL_SECS") {
        match v.trim().parse() {
            Ok(n) => settings.queue.log_interval_secs = Some(n),
            Err(_) => {
                warn!(key = "BEACON_LOG_INTERVAL_SECS", value = %v, "invalid integer env var, ignoring");
            }
        }
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"queue": {"flushThreshold": 100, "flushIntervalSecs": 15}});
        let source = serde_json::json!({"queue": {"flushThreshold": 20}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["queue"]["flushThreshold"], 20);
        assert_eq!(merged["queue"]["flushIntervalSecs"], 15);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"endpoint": "a"});
        let source = serde_json::json!({"endpoint": null});
        assert_eq!(deep_merge(target, source)["endpoint"], "a");
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"queue": {"flushThreshold": 1}});
        let source = serde_json::json!({"queue": 42});
        assert_eq!(deep_merge(target, source)["queue"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.queue, BeaconSettings::default().queue);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"appId": "app-1", "queue": {"flushThreshold": 25, "logIntervalSecs": 1}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.app_id.as_deref(), Some("app-1"));
        assert_eq!(settings.queue.flush_threshold, 25);
        assert_eq!(settings.queue.log_interval_secs, Some(1));
        assert_eq!(settings.queue.flush_interval_secs, 15);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        assert_matches!(load_settings_from_path(&path), Err(SettingsError::Parse { .. }));
    }

    // ── apply_overrides ─────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = BeaconSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("BEACON_ENDPOINT", "http://localhost:9000"),
                ("BEACON_FLUSH_THRESHOLD", "10"),
                ("BEACON_FLUSH_INTERVAL_SECS", "-1"),
                ("BEACON_LOG_INTERVAL_SECS", "2"),
                ("BEACON_TRACKING_ENABLED", "off"),
            ]),
        );
        assert_eq!(settings.endpoint, "http://localhost:9000");
        assert_eq!(settings.queue.flush_threshold, 10);
        assert_eq!(settings.queue.flush_interval_secs, -1);
        assert_eq!(settings.queue.log_interval_secs, Some(2));
        assert!(!settings.tracking_enabled);
    }

    #[test]
    fn invalid_overrides_ignored() {
        let mut settings = BeaconSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("BEACON_FLUSH_THRESHOLD", "lots"),
                ("BEACON_TRACKING_ENABLED", "maybe"),
                ("BEACON_APP_ID", ""),
            ]),
        );
        assert_eq!(settings, BeaconSettings::default());
    }

    #[test]
    fn parse_bool_variants() {
        for val in ["true", "1", "yes", "ON"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("2"), None);
    }
}
