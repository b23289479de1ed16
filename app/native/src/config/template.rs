//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file documenting every option with its default value.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Edgehop Configuration File
// ===========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
// Changes take effect the next time edgehop starts.
//
// Documentation: https://github.com/marcosmoura/edgehop

{
  // ============================================================================
  // Cursor Edge Jumping
  // ============================================================================
  // Moves the cursor onto the neighbouring display when it reaches an edge,
  // even when the displays are offset, differently sized or apart.
  // "cursor": {
  //   // Enable or disable edge jumping
  //   "enabled": true,
  //
  //   // How often the cursor is sampled, in milliseconds
  //   "pollIntervalMs": 20,
  //
  //   // Minimum time between two jumps, in milliseconds
  //   "cooldownMs": 50,
  //
  //   // Distance in pixels from an edge at which the cursor is "at the edge"
  //   "edgeThreshold": 3,
  //
  //   // Overlap in pixels allowed when deciding that a display is a neighbour
  //   "adjacencyTolerance": 10,
  //
  //   // Extra range in pixels around a neighbour that still leads to it
  //   "zoneMargin": 100,
  //
  //   // How far inside the neighbour the cursor lands, in pixels
  //   "landingInset": 10,
  //
  //   // Speed along the edge (pixels per sample) above which direction counts
  //   "directionThreshold": 10,
  //
  //   // Scoring weights
  //   "directionBonus": 800,
  //   "containmentScore": 1000,
  //   "baseScore": 500,
  //   "acceptanceThreshold": 200
  // },

  // ============================================================================
  // Window Fill
  // ============================================================================
  // Resizes a window to fill a display after it is moved onto it.
  // "windowFill": {
  //   // Enable or disable window fill
  //   "enabled": true,
  //
  //   // Delay after the last move before resizing, in milliseconds
  //   "settleDelayMs": 300
  // }
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EdgeHopConfig, parse_jsonc};

    #[test]
    fn test_template_parses_to_defaults() {
        let config: EdgeHopConfig = parse_jsonc(&generate_config_template()).unwrap();
        assert_eq!(config, EdgeHopConfig::default());
    }

    #[test]
    fn test_template_mentions_every_section() {
        let template = generate_config_template();
        assert!(template.contains("\"cursor\""));
        assert!(template.contains("\"windowFill\""));
        assert!(template.contains("pollIntervalMs"));
        assert!(template.contains("settleDelayMs"));
    }

    #[test]
    fn test_create_config_file_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("edgehop").join("config.jsonc");
        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
