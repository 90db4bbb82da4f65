//! Configuration for the arrangement engine
//!
//! Every heuristic threshold the engine uses lives here with its default, so
//! callers and tests can exercise boundary behavior without touching code.
//! Configuration can be loaded from TOML; missing keys keep their defaults.
//!
//! ```toml
//! [pairing]
//! tight_tolerance = 10.0
//!
//! [execution]
//! batch_size = 20
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading engine configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Thresholds for telling displays apart from buttons
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoleThresholds {
    /// A display is wider than this multiple of the average rectangle width...
    pub display_width_factor: f64,
    /// ...or has a width/height ratio above this
    pub display_aspect_ratio: f64,
    /// Rectangles within this many average heights of the lowest row are never displays
    pub bottom_band_factor: f64,
}

impl Default for RoleThresholds {
    fn default() -> Self {
        Self {
            display_width_factor: 2.5,
            display_aspect_ratio: 3.0,
            bottom_band_factor: 2.0,
        }
    }
}

/// Tolerances for matching rectangles with their labels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PairingThresholds {
    /// Elements whose y falls in the same bucket of this height share a reading row
    pub row_bucket: f64,
    /// Fixed tolerance (px) for the first pass
    pub tight_tolerance: f64,
    /// Fraction of the rectangle size used as tolerance in the second pass
    pub expanded_fraction: f64,
    /// Lower bound (px) of the second-pass tolerance
    pub expanded_floor: f64,
    /// Nearest-neighbor matches must be closer than this multiple of the larger side
    pub nearest_factor: f64,
}

impl Default for PairingThresholds {
    fn default() -> Self {
        Self {
            row_bucket: 20.0,
            tight_tolerance: 12.0,
            expanded_fraction: 0.5,
            expanded_floor: 30.0,
            nearest_factor: 2.5,
        }
    }
}

/// Thresholds for interface archetype detection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchetypeThresholds {
    pub calculator_min_buttons: usize,
    pub menu_min_buttons: usize,
    pub menu_min_mean_label_len: f64,
    pub dashboard_min_displays: usize,
}

impl Default for ArchetypeThresholds {
    fn default() -> Self {
        Self {
            calculator_min_buttons: 10,
            menu_min_buttons: 4,
            menu_min_mean_label_len: 3.0,
            dashboard_min_displays: 2,
        }
    }
}

/// Planner defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Button size used when there are no buttons to sample
    pub default_button_size: (f64, f64),
    /// Horizontal margin kept free at the container's right edge and used by the clamp
    pub margin: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_button_size: (60.0, 60.0),
            margin: 10.0,
        }
    }
}

/// Mutation dispatch settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Calls per batch on the deterministic path
    pub batch_size: usize,
    /// Calls per batch when positions came from the delegated backend
    pub delegated_batch_size: usize,
    /// Round button corners to this radius after moving them
    pub corner_radius: Option<f64>,
    /// Bring paired labels in front of their rectangles
    pub raise_labels: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delegated_batch_size: 5,
            corner_radius: None,
            raise_labels: false,
        }
    }
}

/// Configuration options for the whole engine
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub roles: RoleThresholds,
    pub pairing: PairingThresholds,
    pub archetype: ArchetypeThresholds,
    pub planner: PlannerConfig,
    pub execution: ExecutionConfig,
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the clamp margin
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.planner.margin = margin;
        self
    }

    /// Set both batch sizes
    pub fn with_batch_sizes(mut self, deterministic: usize, delegated: usize) -> Self {
        self.execution.batch_size = deterministic;
        self.execution.delegated_batch_size = delegated;
        self
    }

    /// Round button corners after positioning
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.execution.corner_radius = Some(radius);
        self
    }

    /// Raise paired labels above their rectangles after positioning
    pub fn with_raised_labels(mut self, raise: bool) -> Self {
        self.execution.raise_labels = raise;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.roles.display_width_factor, 2.5);
        assert_eq!(config.pairing.tight_tolerance, 12.0);
        assert_eq!(config.pairing.expanded_floor, 30.0);
        assert_eq!(config.archetype.calculator_min_buttons, 10);
        assert_eq!(config.planner.margin, 10.0);
        assert_eq!(config.execution.batch_size, 10);
        assert_eq!(config.execution.delegated_batch_size, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
[pairing]
tight_tolerance = 15.0

[execution]
corner_radius = 8.0
"#,
        )
        .expect("Should parse");
        assert_eq!(config.pairing.tight_tolerance, 15.0);
        assert_eq!(config.pairing.nearest_factor, 2.5);
        assert_eq!(config.execution.corner_radius, Some(8.0));
        assert_eq!(config.execution.batch_size, 10);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_margin(4.0)
            .with_batch_sizes(3, 2)
            .with_raised_labels(true);
        assert_eq!(config.planner.margin, 4.0);
        assert_eq!(config.execution.batch_size, 3);
        assert_eq!(config.execution.delegated_batch_size, 2);
        assert!(config.execution.raise_labels);
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(EngineConfig::from_toml("this is not valid toml {{{{").is_err());
    }
}
