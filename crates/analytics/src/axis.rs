use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Fraction of the data span added above and below the plotted values.
const AXIS_PADDING: f64 = 0.1;

/// The value-axis range of the chart. The outer edges of the red band are
/// pinned to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, AnalyticsError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(AnalyticsError::InvalidAxis { min, max });
        }
        Ok(Self { min, max })
    }

    /// Derives a padded range covering every finite value of the given series.
    /// Falls back to `[0, 1]` when there is nothing finite to plot.
    pub fn from_series(series: &[&[f64]]) -> Self {
        let (lo, hi) = series
            .iter()
            .flat_map(|s| s.iter().copied())
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !lo.is_finite() || !hi.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }

        let span = hi - lo;
        let pad = if span > 0.0 {
            span * AXIS_PADDING
        } else {
            (hi.abs() * AXIS_PADDING).max(1.0)
        };
        Self {
            min: lo - pad,
            max: hi + pad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_axis(axis: AxisBounds, min: f64, max: f64) {
        assert!((axis.min - min).abs() < 1e-9, "min {} != {}", axis.min, min);
        assert!((axis.max - max).abs() < 1e-9, "max {} != {}", axis.max, max);
    }

    #[test]
    fn pads_the_data_span() {
        let actual = [10.0, 30.0];
        let expected = [f64::NAN, 20.0];
        let axis = AxisBounds::from_series(&[&actual[..], &expected[..]]);
        assert_axis(axis, 8.0, 32.0);
    }

    #[test]
    fn flat_series_still_has_height() {
        let axis = AxisBounds::from_series(&[&[50.0, 50.0][..]]);
        assert_axis(axis, 45.0, 55.0);
    }

    #[test]
    fn empty_series_defaults_to_unit_range() {
        let empty: [f64; 0] = [];
        let axis = AxisBounds::from_series(&[&empty[..], &[f64::NAN][..]]);
        assert_eq!(axis, AxisBounds { min: 0.0, max: 1.0 });
    }

    #[test]
    fn explicit_bounds_are_checked() {
        assert!(AxisBounds::new(0.0, 10.0).is_ok());
        assert!(AxisBounds::new(10.0, 10.0).is_err());
        assert!(AxisBounds::new(f64::NAN, 10.0).is_err());
    }
}
