//! Display layout files.
//!
//! A layout describes a display arrangement for the virtual host, used by the
//! `zones` and `probe` commands to inspect jump behaviour without touching
//! the real desktop:
//!
//! ```jsonc
//! {
//!   // Laptop on the left, external monitor raised to its right
//!   "displays": [
//!     { "x": 0, "y": 0, "width": 1512, "height": 982 },
//!     { "x": 1512, "y": -400, "w": 2560, "h": 1440 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ConfigError, parse_jsonc};
use crate::geometry::Rect;

/// A display arrangement, in host order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLayout {
    /// Display frames in global coordinates, top-left origin.
    pub displays: Vec<Rect>,
}

impl DisplayLayout {
    /// Two 1920x1080 displays side by side.
    #[must_use]
    pub fn side_by_side() -> Self {
        Self {
            displays: vec![
                Rect::new(0.0, 0.0, 1920.0, 1080.0),
                Rect::new(1920.0, 0.0, 1920.0, 1080.0),
            ],
        }
    }
}

/// Reads a layout file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound`, `ConfigError::Io` or `ConfigError::Parse`
/// for missing, unreadable or malformed files, and `ConfigError::Invalid` if
/// the layout has no displays.
pub fn load_layout(path: &Path) -> Result<DisplayLayout, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let text = fs::read_to_string(path)?;
    let layout: DisplayLayout = parse_jsonc(&text)?;
    if layout.displays.is_empty() {
        return Err(ConfigError::Invalid(format!("{} lists no displays", path.display())));
    }
    Ok(layout)
}
