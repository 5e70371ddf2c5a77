use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCOPE: &str = "-default";

/// Geometry and storage settings shared by normalization, composition and the storage
/// adapter. Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BadgeConfig {
    /// Intrinsic height of every persisted fragment.
    pub normalization_height: f64,
    /// Height of a rendered badge row.
    pub row_height: f64,
    /// Spacing between grid rows and between grid columns.
    pub gap: f64,
    /// Corner radius of the clip rectangle, in normalization units.
    pub corner_radius: f64,
    /// Scope searched when an owner-specific badge is absent.
    pub default_scope: String,
    pub store_root: Option<PathBuf>,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            normalization_height: 100.0,
            row_height: 40.0,
            gap: 5.0,
            corner_radius: 8.0,
            default_scope: DEFAULT_SCOPE.to_string(),
            store_root: None,
        }
    }
}

impl BadgeConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("normalizationHeight", self.normalization_height),
            ("rowHeight", self.row_height),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config {
                    message: format!("{key} must be a positive number, got {value}"),
                });
            }
        }
        let non_negative = [("gap", self.gap), ("cornerRadius", self.corner_radius)];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config {
                    message: format!("{key} must be a non-negative number, got {value}"),
                });
            }
        }
        if self.default_scope.trim().is_empty() {
            return Err(Error::Config {
                message: "defaultScope must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_default_scope(&self, scope: &str) -> bool {
        scope == self.default_scope
    }
}
