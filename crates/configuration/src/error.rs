use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(#[from] ValidationError),
}

/// Identifies a single tunable of `ZoneConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    GreenUpperBase,
    AmberWidth,
    StdGreenUpper,
    StdAmberUpper,
    ToleranceMin,
    ToleranceMax,
}

impl ConfigField {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigField::GreenUpperBase => "green_upper_base",
            ConfigField::AmberWidth => "amber_width",
            ConfigField::StdGreenUpper => "std_green_upper",
            ConfigField::StdAmberUpper => "std_amber_upper",
            ConfigField::ToleranceMin => "tolerance_min",
            ConfigField::ToleranceMax => "tolerance_max",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a candidate configuration was rejected. The previous configuration is
/// always left in place when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: ConfigField, value: f64 },

    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: ConfigField,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("std_amber_upper ({amber}) must be strictly greater than std_green_upper ({green})")]
    SigmaOrder { green: f64, amber: f64 },

    #[error("tolerance_min ({min}) must not exceed tolerance_max ({max})")]
    ToleranceOrder { min: f64, max: f64 },
}

impl ValidationError {
    /// The field that failed validation.
    pub fn field(&self) -> ConfigField {
        match self {
            ValidationError::NotFinite { field, .. } | ValidationError::OutOfRange { field, .. } => {
                *field
            }
            ValidationError::SigmaOrder { .. } => ConfigField::StdAmberUpper,
            ValidationError::ToleranceOrder { .. } => ConfigField::ToleranceMax,
        }
    }
}

/// Failures of the external persisted-thresholds service.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Config store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config store returned malformed data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Config store holds no saved thresholds")]
    Empty,

    #[error("Config store unavailable: {0}")]
    Unavailable(String),
}
