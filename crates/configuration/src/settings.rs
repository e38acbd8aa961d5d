use crate::error::{ConfigField, ValidationError};
use crate::store::PersistedThresholds;
use serde::{Deserialize, Serialize};

/// Allowed range for `green_upper_base`, in percent.
pub const GREEN_UPPER_BASE_RANGE: (f64, f64) = (0.0, 100.0);
/// Allowed range for `amber_width`, in percent.
pub const AMBER_WIDTH_RANGE: (f64, f64) = (0.0, 50.0);
/// Allowed range for `std_green_upper`, in standard deviations.
pub const STD_GREEN_UPPER_RANGE: (f64, f64) = (0.5, 5.0);
/// Upper limit for `std_amber_upper`. Its lower limit is `std_green_upper` (exclusive).
pub const STD_AMBER_UPPER_MAX: f64 = 6.0;
/// Range the tolerance slider bounds must sit in.
pub const TOLERANCE_RANGE: (f64, f64) = (0.0, 100.0);

/// The tunable parameters of the zone engine.
///
/// A `ZoneConfig` is an immutable value. It is only ever replaced wholesale,
/// after `validate` has accepted the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Relative-error green ceiling, in percent.
    pub green_upper_base: f64,
    /// Width of the relative-error amber band, in percent.
    pub amber_width: f64,
    /// Sigma multiplier bounding the green zone.
    pub std_green_upper: f64,
    /// Sigma multiplier bounding the amber zone.
    pub std_amber_upper: f64,
    /// Lowest tolerance offset the slider may produce.
    pub tolerance_min: f64,
    /// Highest tolerance offset the slider may produce.
    pub tolerance_max: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            green_upper_base: 10.0,
            amber_width: 10.0,
            std_green_upper: 1.0,
            std_amber_upper: 2.0,
            tolerance_min: 0.0,
            tolerance_max: 100.0,
        }
    }
}

impl ZoneConfig {
    /// Validates `self`, returning it unchanged when every rule holds.
    pub fn validate(self) -> Result<Self, ValidationError> {
        validate(self)
    }

    /// Clamps a slider tolerance offset into the configured bounds.
    /// Non-finite offsets are treated as the lower bound.
    pub fn clamp_tolerance(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return self.tolerance_min;
        }
        offset.clamp(self.tolerance_min, self.tolerance_max)
    }

    /// The subset of this config that the external store persists.
    pub fn persisted(&self) -> PersistedThresholds {
        PersistedThresholds {
            green_upper: self.green_upper_base,
            amber_width: self.amber_width,
        }
    }

    /// A candidate config carrying the stored relative-error values. The
    /// sigma and slider settings are session-local and kept from `self`.
    pub fn with_persisted(&self, stored: PersistedThresholds) -> Self {
        Self {
            green_upper_base: stored.green_upper,
            amber_width: stored.amber_width,
            ..*self
        }
    }
}

/// Checks a candidate config against every bound. On failure the typed error
/// names the offending field; nothing is applied.
pub fn validate(candidate: ZoneConfig) -> Result<ZoneConfig, ValidationError> {
    let fields = [
        (ConfigField::GreenUpperBase, candidate.green_upper_base),
        (ConfigField::AmberWidth, candidate.amber_width),
        (ConfigField::StdGreenUpper, candidate.std_green_upper),
        (ConfigField::StdAmberUpper, candidate.std_amber_upper),
        (ConfigField::ToleranceMin, candidate.tolerance_min),
        (ConfigField::ToleranceMax, candidate.tolerance_max),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
    }

    check_range(ConfigField::GreenUpperBase, candidate.green_upper_base, GREEN_UPPER_BASE_RANGE)?;
    check_range(ConfigField::AmberWidth, candidate.amber_width, AMBER_WIDTH_RANGE)?;
    check_range(ConfigField::StdGreenUpper, candidate.std_green_upper, STD_GREEN_UPPER_RANGE)?;

    if candidate.std_amber_upper <= candidate.std_green_upper {
        return Err(ValidationError::SigmaOrder {
            green: candidate.std_green_upper,
            amber: candidate.std_amber_upper,
        });
    }
    check_range(
        ConfigField::StdAmberUpper,
        candidate.std_amber_upper,
        (candidate.std_green_upper, STD_AMBER_UPPER_MAX),
    )?;

    check_range(ConfigField::ToleranceMin, candidate.tolerance_min, TOLERANCE_RANGE)?;
    check_range(ConfigField::ToleranceMax, candidate.tolerance_max, TOLERANCE_RANGE)?;
    if candidate.tolerance_min > candidate.tolerance_max {
        return Err(ValidationError::ToleranceOrder {
            min: candidate.tolerance_min,
            max: candidate.tolerance_max,
        });
    }

    Ok(candidate)
}

fn check_range(field: ConfigField, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

/// Optional per-field overrides, typically supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ZoneConfigOverrides {
    /// Relative-error green ceiling, in percent.
    #[cfg_attr(feature = "clap", arg(long))]
    pub green_upper_base: Option<f64>,
    /// Relative-error amber band width, in percent.
    #[cfg_attr(feature = "clap", arg(long))]
    pub amber_width: Option<f64>,
    /// Sigma multiplier for the green zone.
    #[cfg_attr(feature = "clap", arg(long))]
    pub std_green_upper: Option<f64>,
    /// Sigma multiplier for the amber zone.
    #[cfg_attr(feature = "clap", arg(long))]
    pub std_amber_upper: Option<f64>,
}

impl ZoneConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Builds an unvalidated candidate from `base` with the overrides applied.
    pub fn apply_to(&self, base: &ZoneConfig) -> ZoneConfig {
        ZoneConfig {
            green_upper_base: self.green_upper_base.unwrap_or(base.green_upper_base),
            amber_width: self.amber_width.unwrap_or(base.amber_width),
            std_green_upper: self.std_green_upper.unwrap_or(base.std_green_upper),
            std_amber_upper: self.std_amber_upper.unwrap_or(base.std_amber_upper),
            ..*base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ZoneConfig::default().validate().is_ok());
    }

    #[test]
    fn accepts_inclusive_bounds() {
        let candidate = ZoneConfig {
            green_upper_base: 100.0,
            amber_width: 50.0,
            std_green_upper: 5.0,
            std_amber_upper: 6.0,
            tolerance_min: 0.0,
            tolerance_max: 100.0,
        };
        assert_eq!(validate(candidate), Ok(candidate));
    }

    #[test]
    fn rejects_green_base_out_of_range() {
        let candidate = ZoneConfig { green_upper_base: 100.5, ..ZoneConfig::default() };
        let err = validate(candidate).unwrap_err();
        assert_eq!(err.field(), ConfigField::GreenUpperBase);
        assert!(matches!(err, ValidationError::OutOfRange { max, .. } if max == 100.0));
    }

    #[test]
    fn rejects_negative_amber_width() {
        let candidate = ZoneConfig { amber_width: -1.0, ..ZoneConfig::default() };
        assert_eq!(validate(candidate).unwrap_err().field(), ConfigField::AmberWidth);
    }

    #[test]
    fn rejects_amber_width_above_fifty() {
        let candidate = ZoneConfig { amber_width: 50.01, ..ZoneConfig::default() };
        assert_eq!(validate(candidate).unwrap_err().field(), ConfigField::AmberWidth);
    }

    #[test]
    fn rejects_small_sigma_green() {
        let candidate = ZoneConfig { std_green_upper: 0.4, ..ZoneConfig::default() };
        assert_eq!(validate(candidate).unwrap_err().field(), ConfigField::StdGreenUpper);
    }

    #[test]
    fn sigma_amber_must_exceed_green_strictly() {
        let candidate = ZoneConfig {
            std_green_upper: 2.0,
            std_amber_upper: 2.0,
            ..ZoneConfig::default()
        };
        assert_eq!(
            validate(candidate),
            Err(ValidationError::SigmaOrder { green: 2.0, amber: 2.0 })
        );
    }

    #[test]
    fn sigma_amber_capped_at_six() {
        let candidate = ZoneConfig { std_amber_upper: 6.5, ..ZoneConfig::default() };
        assert_eq!(validate(candidate).unwrap_err().field(), ConfigField::StdAmberUpper);
    }

    #[test]
    fn rejects_nan() {
        let candidate = ZoneConfig { amber_width: f64::NAN, ..ZoneConfig::default() };
        assert!(matches!(
            validate(candidate),
            Err(ValidationError::NotFinite { field: ConfigField::AmberWidth, .. })
        ));
    }

    #[test]
    fn rejects_inverted_slider_bounds() {
        let candidate = ZoneConfig {
            tolerance_min: 60.0,
            tolerance_max: 40.0,
            ..ZoneConfig::default()
        };
        assert_eq!(validate(candidate).unwrap_err().field(), ConfigField::ToleranceMax);
    }

    #[test]
    fn clamps_tolerance_into_slider_bounds() {
        let config = ZoneConfig {
            tolerance_min: 5.0,
            tolerance_max: 20.0,
            ..ZoneConfig::default()
        };
        assert_eq!(config.clamp_tolerance(-3.0), 5.0);
        assert_eq!(config.clamp_tolerance(12.5), 12.5);
        assert_eq!(config.clamp_tolerance(99.0), 20.0);
        assert_eq!(config.clamp_tolerance(f64::NAN), 5.0);
    }

    #[test]
    fn persisted_round_trip_keeps_session_fields() {
        let config = ZoneConfig { std_green_upper: 1.5, ..ZoneConfig::default() };
        let stored = PersistedThresholds { green_upper: 25.0, amber_width: 5.0 };
        let merged = config.with_persisted(stored);
        assert_eq!(merged.persisted(), stored);
        assert_eq!(merged.std_green_upper, 1.5);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = ZoneConfigOverrides {
            amber_width: Some(15.0),
            ..ZoneConfigOverrides::default()
        };
        let merged = overrides.apply_to(&ZoneConfig::default());
        assert_eq!(merged.amber_width, 15.0);
        assert_eq!(merged.green_upper_base, ZoneConfig::default().green_upper_base);
        assert!(ZoneConfigOverrides::default().is_empty());
        assert!(!overrides.is_empty());
    }
}
