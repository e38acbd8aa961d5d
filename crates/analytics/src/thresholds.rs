use configuration::ZoneConfig;
use serde::{Deserialize, Serialize};

/// Concrete relative-error zone boundaries, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub level1_upper: f64,
    pub level2_lower: f64,
    pub level2_upper: f64,
    pub level3_lower: f64,
    /// Suggested maximum of the deviation axis. Not used for classification.
    pub level3_upper: f64,
}

/// Resolves relative-error boundaries from the config and the transient
/// tolerance offset. The offset widens the green zone; amber keeps its width.
pub fn resolve_thresholds(config: &ZoneConfig, tolerance_offset: f64) -> Thresholds {
    let tolerance = tolerance_offset + config.green_upper_base;
    Thresholds {
        level1_upper: tolerance,
        level2_lower: tolerance,
        level2_upper: tolerance + config.amber_width,
        level3_lower: tolerance + config.amber_width,
        level3_upper: (tolerance + 50.0).max(100.0),
    }
}

/// Sigma-mode boundaries, in standard deviations, taken straight from config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaThresholds {
    pub green_upper: f64,
    pub amber_upper: f64,
}

impl SigmaThresholds {
    pub fn from_config(config: &ZoneConfig) -> Self {
        Self {
            green_upper: config.std_green_upper,
            amber_upper: config.std_amber_upper,
        }
    }
}

/// The boundaries in force for whichever mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActiveThresholds {
    RelativeError(Thresholds),
    Sigma(SigmaThresholds),
}

impl ActiveThresholds {
    /// Inclusive upper limit of the green zone.
    pub fn green_limit(&self) -> f64 {
        match self {
            ActiveThresholds::RelativeError(t) => t.level1_upper,
            ActiveThresholds::Sigma(t) => t.green_upper,
        }
    }

    /// Inclusive upper limit of the amber zone.
    pub fn amber_limit(&self) -> f64 {
        match self {
            ActiveThresholds::RelativeError(t) => t.level2_upper,
            ActiveThresholds::Sigma(t) => t.amber_upper,
        }
    }
}
