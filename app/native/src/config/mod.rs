//! Configuration module for Edgehop.
//!
//! This module provides configuration types, loading functionality, file
//! watching and the JSON Schema of the configuration file.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod layout;
pub mod template;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};

pub use layout::{DisplayLayout, load_layout};
pub use types::{
    ConfigError, CursorConfig, EdgeHopConfig, WindowFillConfig, config_paths,
    load_config as load_config_default, load_config_from_path, parse_jsonc,
};
pub use watcher::{ConfigWatcher, watch_and_warn, watch_config_file};

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: EdgeHopConfig,
    /// `None` when running on defaults.
    pub path: Option<PathBuf>,
}

/// Loads the configuration from `custom_path` or the default search paths.
///
/// Without a custom path, a missing file means defaults.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if `custom_path` is given but missing, and
/// any read, parse or validation error of the file that was found.
pub fn load_existing(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    match custom_path.map_or_else(load_config_default, load_config_from_path) {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "config: loaded");
            Ok(LoadedConfig { config, path: Some(path) })
        }
        Err(ConfigError::NotFound) if custom_path.is_none() => Ok(LoadedConfig::default()),
        Err(err) => Err(err),
    }
}

/// Like [`load_existing`], but writes a commented template to the preferred
/// location when no configuration file exists yet.
///
/// # Errors
///
/// Same as [`load_existing`].
pub fn load(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let loaded = load_existing(custom_path)?;
    if loaded.path.is_some() {
        return Ok(loaded);
    }
    Ok(LoadedConfig { path: create_default_config_file(), ..loaded })
}

/// Writes the template to the preferred config path if nothing is there yet.
///
/// Returns the path that was written.
fn create_default_config_file() -> Option<PathBuf> {
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("config: no config path available for creating template");
        return None;
    };

    if config_path.exists() {
        return None;
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(path = %config_path.display(), "config: created default configuration file");
            Some(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "config: failed to create default configuration file"
            );
            None
        }
    }
}

/// Generates the JSON Schema of the configuration file.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(EdgeHopConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!(
                "https://raw.githubusercontent.com/marcosmoura/edgehop/main/edgehop.schema.json"
            ),
        );
    }

    schema
}

/// Pretty-printed JSON Schema of the configuration file.
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_schema_describes_both_sections() {
        let parsed: serde_json::Value = serde_json::from_str(&generate_schema_json()).unwrap();
        assert!(parsed["$id"].as_str().unwrap().contains("edgehop.schema.json"));
        assert_eq!(parsed["title"], "EdgeHopConfig");
        assert!(parsed["properties"]["cursor"].is_object());
        assert!(parsed["properties"]["windowFill"].is_object());
    }

    #[test]
    fn test_load_custom_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "windowFill": {{ "settleDelayMs": 500 }} }}"#).unwrap();

        let loaded = load(Some(file.path())).unwrap();
        assert_eq!(loaded.config.window_fill.settle_delay_ms, 500);
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_custom_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jsonc");
        assert!(matches!(load(Some(&missing)), Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ broken").unwrap();
        assert!(matches!(load_existing(Some(file.path())), Err(ConfigError::Parse(_))));
    }
}
