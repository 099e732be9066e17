//! Import Settings
//!
//! Options that shape an import: the rig scale and the vertex welding
//! tolerances. Settings can be built in code or read from JSON; missing keys
//! take their defaults and unknown keys are rejected.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gladius::settings::{ImportSettings, WeldSettings};
//!
//! // Defaults: scale 1.0, welding on
//! let settings = ImportSettings::default();
//!
//! // Keep the exploded triangle soup
//! let settings = ImportSettings {
//!     weld: WeldSettings { enabled: false, ..Default::default() },
//!     ..Default::default()
//! };
//!
//! // From a config file
//! let settings = ImportSettings::from_json_str(r#"{ "scale": 0.01 }"#)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ImportError, Result};

// ---------------------------------------------------------------------------
// WeldSettings
// ---------------------------------------------------------------------------

/// Tolerances for [`crate::mesh::VertexWelder`].
///
/// Two corners merge when their positions are closer than
/// `position_tolerance`, their normals closer than `normal_tolerance`, they
/// share the same bone set and their weight vectors are closer than
/// `weight_tolerance`. All distances are Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeldSettings {
    pub enabled: bool,
    pub position_tolerance: f32,
    /// The default of 1.99 lets almost any two unit normals merge; only
    /// opposite-facing corners stay apart.
    pub normal_tolerance: f32,
    pub weight_tolerance: f32,
}

impl Default for WeldSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            position_tolerance: 0.001,
            normal_tolerance: 1.99,
            weight_tolerance: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// ImportSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSettings {
    /// Uniform scale of the imported rig.
    pub scale: f32,
    pub weld: WeldSettings,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            weld: WeldSettings::default(),
        }
    }
}

impl ImportSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Settings with welding turned off.
    #[must_use]
    pub fn without_welding(mut self) -> Self {
        self.weld.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            ImportSettings::from_json_str(r#"{ "weld": { "position_tolerance": 0.5 } }"#).unwrap();
        assert!((settings.scale - 1.0).abs() < 1e-6);
        assert!(settings.weld.enabled);
        assert!((settings.weld.position_tolerance - 0.5).abs() < 1e-6);
        assert!((settings.weld.weight_tolerance - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            ImportSettings::from_json_str(r#"{ "scael": 2.0 }"#),
            Err(ImportError::Settings(_))
        ));
    }
}
