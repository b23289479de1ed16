//! Configuration types for Edgehop.
//!
//! This module defines the configuration structures loaded from the JSONC
//! configuration file, together with the file search and loading helpers.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{geometry, scoring, timing};

/// Cursor edge-jump configuration.
///
/// Distances are in pixels, speeds in pixels per poll tick and durations in
/// milliseconds. Values are read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorConfig {
    /// Enable or disable edge jumping.
    /// Default: true
    pub enabled: bool,

    /// How often the cursor is sampled, in milliseconds.
    /// Default: 20
    pub poll_interval_ms: u64,

    /// Minimum time between two jumps, in milliseconds.
    /// Default: 50
    pub cooldown_ms: u64,

    /// Distance from a display edge at which the cursor counts as at the edge.
    /// Default: 3
    pub edge_threshold: f64,

    /// Overlap allowed when deciding whether a display lies beyond an edge.
    /// Default: 10
    pub adjacency_tolerance: f64,

    /// Extra range on each side of a neighbour that still leads to it.
    /// Default: 100
    pub zone_margin: f64,

    /// How far inside the target display the cursor lands.
    /// Default: 10
    pub landing_inset: f64,

    /// Speed along the edge above which the direction of travel counts.
    /// Default: 10
    pub direction_threshold: f64,

    /// Score added to neighbours in the direction of travel.
    /// Default: 800
    pub direction_bonus: f64,

    /// Score of a neighbour directly beside the cursor.
    /// Default: 1000
    pub containment_score: f64,

    /// Score of a neighbour beside the cursor minus its distance.
    /// Default: 500
    pub base_score: f64,

    /// Minimum score for a jump to happen.
    /// Default: 200
    pub acceptance_threshold: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            cooldown_ms: timing::JUMP_COOLDOWN_MS,
            edge_threshold: geometry::EDGE_THRESHOLD_PX,
            adjacency_tolerance: geometry::ADJACENCY_TOLERANCE_PX,
            zone_margin: geometry::ZONE_MARGIN_PX,
            landing_inset: geometry::LANDING_INSET_PX,
            direction_threshold: scoring::DIRECTION_THRESHOLD,
            direction_bonus: scoring::DIRECTION_BONUS,
            containment_score: scoring::CONTAINMENT_SCORE,
            base_score: scoring::BASE_SCORE,
            acceptance_threshold: scoring::ACCEPTANCE_THRESHOLD,
        }
    }
}

impl CursorConfig {
    /// Returns whether edge jumping is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }
}

/// Window fill configuration.
///
/// When a window is moved onto another display, it is resized to fill that
/// display once the move has settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowFillConfig {
    /// Enable or disable window fill.
    /// Default: true
    pub enabled: bool,

    /// Delay after the last move before the window is resized, in milliseconds.
    /// Default: 300
    pub settle_delay_ms: u64,
}

impl Default for WindowFillConfig {
    fn default() -> Self { Self { enabled: true, settle_delay_ms: timing::FILL_SETTLE_DELAY_MS } }
}

impl WindowFillConfig {
    /// Returns whether window fill is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }
}

/// Root configuration structure for Edgehop.
///
/// Every section is optional; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeHopConfig {
    /// Cursor edge-jump settings.
    pub cursor: CursorConfig,

    /// Window fill settings.
    pub window_fill: WindowFillConfig,
}

impl EdgeHopConfig {
    /// Checks values that would make the service misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cursor = &self.cursor;
        if cursor.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("cursor.pollIntervalMs must be greater than 0".into()));
        }

        let distances = [
            ("edgeThreshold", cursor.edge_threshold),
            ("adjacencyTolerance", cursor.adjacency_tolerance),
            ("zoneMargin", cursor.zone_margin),
            ("landingInset", cursor.landing_inset),
            ("directionThreshold", cursor.direction_threshold),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "cursor.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let scores = [
            ("directionBonus", cursor.direction_bonus),
            ("containmentScore", cursor.containment_score),
            ("baseScore", cursor.base_score),
            ("acceptanceThreshold", cursor.acceptance_threshold),
        ];
        for (name, value) in scores {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("cursor.{name} must be finite")));
            }
        }

        Ok(())
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/edgehop/config.jsonc, \
         ~/Library/Application Support/edgehop/config.jsonc, or ~/.edgehop.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".edgehop.jsonc", ".edgehop.json"];

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/edgehop/config.jsonc` if the variable is set
/// 2. `~/.config/edgehop/config.jsonc`
/// 3. `~/Library/Application Support/edgehop/config.jsonc` (platform config dir)
/// 4. `~/.edgehop.jsonc`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let dir = PathBuf::from(xdg_config).join("edgehop");
        for filename in CONFIG_FILE_NAMES {
            push_unique(&mut paths, dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join("edgehop");
        for filename in CONFIG_FILE_NAMES {
            push_unique(&mut paths, dir.join(filename));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let dir = config_dir.join("edgehop");
        for filename in CONFIG_FILE_NAMES {
            push_unique(&mut paths, dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            push_unique(&mut paths, home.join(filename));
        }
    }

    paths
}

/// Parses a JSONC document, stripping `//` and `/* */` comments first.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the document is not valid JSON once
/// comments are removed.
pub fn parse_jsonc<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ConfigError> {
    let reader = json_comments::StripComments::new(text.as_bytes());
    Ok(serde_json::from_reader(reader)?)
}

/// Loads and validates a configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::Io` if it cannot be read, `ConfigError::Parse` if it is not
/// valid JSONC and `ConfigError::Invalid` if validation fails.
pub fn load_config_from_path(path: &Path) -> Result<(EdgeHopConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: EdgeHopConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the error from [`load_config_from_path`] for the
/// first file that exists.
pub fn load_config() -> Result<(EdgeHopConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EdgeHopConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.cursor.is_enabled());
        assert!(config.window_fill.is_enabled());
        assert_eq!(config.cursor.poll_interval_ms, 20);
        assert_eq!(config.window_fill.settle_delay_ms, 300);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EdgeHopConfig = parse_jsonc(
            r#"{
                // Only override what we need
                "cursor": { "cooldownMs": 120 },
                /* window fill off */
                "windowFill": { "enabled": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.cursor.cooldown_ms, 120);
        assert_eq!(config.cursor.edge_threshold, 3.0);
        assert!(!config.window_fill.enabled);
        assert_eq!(config.window_fill.settle_delay_ms, 300);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: EdgeHopConfig = parse_jsonc("{}").unwrap();
        assert_eq!(config, EdgeHopConfig::default());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut config = EdgeHopConfig::default();
        config.cursor.poll_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pollIntervalMs"));
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let mut config = EdgeHopConfig::default();
        config.cursor.zone_margin = -1.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("zoneMargin")));
    }

    #[test]
    fn test_negative_base_score_is_allowed() {
        let mut config = EdgeHopConfig::default();
        config.cursor.base_score = -100.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "cursor": {{ "edgeThreshold": 5 }} }} // trailing"#).unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.cursor.edge_threshold, 5.0);
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from_path(&dir.path().join("nope.jsonc")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "cursor": {{ "pollIntervalMs": 0 }} }}"#).unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_config_error_not_found_message() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
