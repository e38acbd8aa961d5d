use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification bucket assigned to a single observation.
///
/// `Unknown` is reserved for observations whose deviation could not be computed
/// (a missing field or a non-finite value). It is never folded into `Green`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    Green,
    Amber,
    Red,
    Unknown,
}

impl Zone {
    /// All zones in severity order, `Unknown` last.
    pub const ALL: [Zone; 4] = [Zone::Green, Zone::Amber, Zone::Red, Zone::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Green => "Green",
            Zone::Amber => "Amber",
            Zone::Red => "Red",
            Zone::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The statistical model used to measure how far an observation strays from
/// its prediction. The two modes share one pipeline but never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationMode {
    /// Percentage deviation of the prediction relative to the actual value.
    #[default]
    RelativeError,
    /// Absolute residual measured in standard deviations.
    Sigma,
}

impl DeviationMode {
    /// Returns the other mode.
    pub fn toggled(&self) -> Self {
        match self {
            DeviationMode::RelativeError => DeviationMode::Sigma,
            DeviationMode::Sigma => DeviationMode::RelativeError,
        }
    }
}

impl fmt::Display for DeviationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviationMode::RelativeError => f.write_str("relative-error"),
            DeviationMode::Sigma => f.write_str("sigma"),
        }
    }
}

impl std::str::FromStr for DeviationMode {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative-error" | "relative_error" | "relative" | "mape" => {
                Ok(DeviationMode::RelativeError)
            }
            "sigma" | "std" | "zscore" | "z-score" => Ok(DeviationMode::Sigma),
            other => Err(crate::CoreError::InvalidInput(
                "mode".to_string(),
                format!("unknown deviation mode '{other}'"),
            )),
        }
    }
}
