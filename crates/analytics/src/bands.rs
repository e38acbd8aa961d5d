//! Continuous band boundaries drawn around the expected-value curve.
//!
//! Relative-error deviation is measured against the *actual* value, while the
//! bands are drawn around the *expected* value. For the plotted band to agree
//! with the classifier, the edges are the actual values that would sit exactly
//! on a threshold: `actual = expected / (1 - t/100)` above and
//! `actual = expected / (1 + t/100)` below.

use crate::axis::AxisBounds;
use crate::error::AnalyticsError;
use crate::thresholds::{SigmaThresholds, Thresholds};
use serde::{Deserialize, Serialize};

/// Ceiling applied to a threshold on the `1 - t/100` side of the
/// relative-error band formula, keeping the divisor away from zero.
///
/// 80% is inherited product behaviour. Whether it is a business rule or just
/// a safety valve is unconfirmed, so it stays a named constant.
pub const RELATIVE_BAND_CAP_PCT: f64 = 80.0;

pub fn cap_threshold(threshold: f64) -> f64 {
    threshold.min(RELATIVE_BAND_CAP_PCT)
}

/// The innermost region, bounded directly by the green thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreenBand {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// A region drawn as two strips, one above and one below the inner bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OuterBand {
    pub upper_top: Vec<f64>,
    pub upper_bottom: Vec<f64>,
    pub lower_top: Vec<f64>,
    pub lower_bottom: Vec<f64>,
}

impl OuterBand {
    /// Outer edge sequences, the pair the renderer fills between the axis
    /// and the inner bands.
    pub fn upper(&self) -> &[f64] {
        &self.upper_top
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower_bottom
    }
}

/// Plot-ready band boundaries for all three zones, each sequence aligned
/// position by position with the filtered records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub green: GreenBand,
    pub amber: OuterBand,
    pub red: OuterBand,
}

impl BandSet {
    /// Number of positions covered. Every sequence has this length.
    pub fn len(&self) -> usize {
        self.green.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every sequence has exactly `n` entries.
    pub fn is_aligned(&self, n: usize) -> bool {
        let outer = |b: &OuterBand| {
            b.upper_top.len() == n
                && b.upper_bottom.len() == n
                && b.lower_top.len() == n
                && b.lower_bottom.len() == n
        };
        self.green.upper.len() == n && self.green.lower.len() == n && outer(&self.amber) && outer(&self.red)
    }

    /// Derives the axis from `data` together with the outer amber curves and
    /// re-pins the red band to it, so red always spans from the amber edge
    /// out to the chart edge. Returns the fitted axis.
    pub fn fit_axis(&mut self, data: &[&[f64]]) -> AxisBounds {
        let mut series: Vec<&[f64]> = data.to_vec();
        series.push(&self.amber.upper_top);
        series.push(&self.amber.lower_bottom);
        let axis = AxisBounds::from_series(&series);
        self.pin_red_to_axis(&axis);
        axis
    }

    /// Sets the red band's outer edges to the axis, the lower one clipped at zero.
    pub fn pin_red_to_axis(&mut self, axis: &AxisBounds) {
        let n = self.len();
        self.red.upper_top = vec![axis.max; n];
        self.red.lower_bottom = vec![axis.min.max(0.0); n];
    }
}

/// Relative-error bands. `expected` carries `NaN` where a record has no
/// prediction, which simply leaves a gap in the inner bands.
pub fn relative_error_bands(expected: &[f64], thresholds: &Thresholds, axis: &AxisBounds) -> BandSet {
    let green_up_div = 1.0 - cap_threshold(thresholds.level1_upper) / 100.0;
    let green_down_div = 1.0 + thresholds.level1_upper / 100.0;
    let amber_up_div = 1.0 - cap_threshold(thresholds.level2_upper) / 100.0;
    let amber_down_div = 1.0 + thresholds.level2_upper / 100.0;

    let green_upper: Vec<f64> = expected.iter().map(|e| e / green_up_div).collect();
    let green_lower: Vec<f64> = expected.iter().map(|e| e / green_down_div).collect();
    let amber_upper: Vec<f64> = expected.iter().map(|e| e / amber_up_div).collect();
    let amber_lower: Vec<f64> = expected.iter().map(|e| e / amber_down_div).collect();

    nest(green_upper, green_lower, amber_upper, amber_lower, axis)
}

/// Sigma bands: `expected ± k * std`, where `stds` holds the volatility each
/// record is measured against (rolling where available, else global).
pub fn sigma_bands(
    expected: &[f64],
    stds: &[f64],
    thresholds: &SigmaThresholds,
    axis: &AxisBounds,
) -> Result<BandSet, AnalyticsError> {
    if stds.len() != expected.len() {
        return Err(AnalyticsError::LengthMismatch {
            expected: expected.len(),
            got: stds.len(),
        });
    }

    let offset = |k: f64, sign: f64| -> Vec<f64> {
        expected
            .iter()
            .zip(stds)
            .map(|(e, s)| e + sign * k * s)
            .collect()
    };

    Ok(nest(
        offset(thresholds.green_upper, 1.0),
        offset(thresholds.green_upper, -1.0),
        offset(thresholds.amber_upper, 1.0),
        offset(thresholds.amber_upper, -1.0),
        axis,
    ))
}

/// Assembles the three regions from the two threshold curves on each side.
/// Amber fills between the green and amber curves; red fills from the amber
/// curves out to the chart edges.
fn nest(
    green_upper: Vec<f64>,
    green_lower: Vec<f64>,
    amber_upper: Vec<f64>,
    amber_lower: Vec<f64>,
    axis: &AxisBounds,
) -> BandSet {
    let red = OuterBand {
        upper_top: Vec::new(),
        upper_bottom: amber_upper.clone(),
        lower_top: amber_lower.clone(),
        lower_bottom: Vec::new(),
    };
    let amber = OuterBand {
        upper_top: amber_upper,
        upper_bottom: green_upper.clone(),
        lower_top: green_lower.clone(),
        lower_bottom: amber_lower,
    };
    let mut bands = BandSet {
        green: GreenBand {
            upper: green_upper,
            lower: green_lower,
        },
        amber,
        red,
    };
    bands.pin_red_to_axis(axis);
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_value;
    use crate::deviation::relative_deviation;
    use core_types::Zone;

    const AXIS: AxisBounds = AxisBounds { min: -20.0, max: 500.0 };

    fn thresholds(level1: f64, level2: f64) -> Thresholds {
        Thresholds {
            level1_upper: level1,
            level2_lower: level1,
            level2_upper: level2,
            level3_lower: level2,
            level3_upper: 100.0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn relative_bands_use_inverse_transform() {
        let bands = relative_error_bands(&[100.0], &thresholds(20.0, 30.0), &AXIS);

        assert!(approx(bands.green.upper[0], 125.0));
        assert!(approx(bands.green.lower[0], 100.0 / 1.2));
        assert!(approx(bands.amber.upper_top[0], 100.0 / 0.7));
        assert!(approx(bands.amber.lower_bottom[0], 100.0 / 1.3));
        assert_eq!(bands.amber.upper_bottom, bands.green.upper);
        assert_eq!(bands.amber.lower_top, bands.green.lower);
        assert_eq!(bands.red.upper_bottom, bands.amber.upper_top);
        assert_eq!(bands.red.lower_top, bands.amber.lower_bottom);
    }

    #[test]
    fn red_band_reaches_axis_edges_clipped_at_zero() {
        let bands = relative_error_bands(&[10.0, 20.0], &thresholds(5.0, 10.0), &AXIS);
        assert_eq!(bands.red.upper_top, vec![500.0, 500.0]);
        assert_eq!(bands.red.lower_bottom, vec![0.0, 0.0]);

        let high = AxisBounds { min: 40.0, max: 90.0 };
        let bands = relative_error_bands(&[50.0], &thresholds(5.0, 10.0), &high);
        assert_eq!(bands.red.lower_bottom, vec![40.0]);
    }

    #[test]
    fn upper_divisor_is_capped() {
        let bands = relative_error_bands(&[10.0], &thresholds(95.0, 140.0), &AXIS);
        assert!(approx(bands.green.upper[0], 50.0));
        assert!(approx(bands.amber.upper_top[0], 50.0));
        assert!(approx(bands.green.lower[0], 10.0 / 1.95));
        assert!(bands.green.upper[0].is_finite());
    }

    #[test]
    fn band_edges_classify_on_the_boundary() {
        let t = thresholds(20.0, 30.0);
        let bands = relative_error_bands(&[80.0], &t, &AXIS);

        for edge in [bands.green.upper[0], bands.green.lower[0]] {
            let d = relative_deviation(edge, Some(80.0));
            assert!(approx(d, 20.0), "edge {edge} gives deviation {d}");
            let nudged_in = relative_deviation(edge + (80.0 - edge) * 1e-6, Some(80.0));
            assert_eq!(classify_value(nudged_in, t.level1_upper, t.level2_upper), Zone::Green);
        }
    }

    #[test]
    fn missing_expected_leaves_gap() {
        let bands = relative_error_bands(&[f64::NAN, 10.0], &thresholds(5.0, 10.0), &AXIS);
        assert!(bands.green.upper[0].is_nan());
        assert!(bands.green.upper[1].is_finite());
        assert!(bands.is_aligned(2));
    }

    #[test]
    fn sigma_bands_are_symmetric() {
        let t = SigmaThresholds { green_upper: 1.0, amber_upper: 2.0 };
        let bands = sigma_bands(&[100.0, 100.0], &[5.0, 10.0], &t, &AXIS).unwrap();

        assert_eq!(bands.green.upper, vec![105.0, 110.0]);
        assert_eq!(bands.green.lower, vec![95.0, 90.0]);
        assert_eq!(bands.amber.upper_top, vec![110.0, 120.0]);
        assert_eq!(bands.amber.lower_bottom, vec![90.0, 80.0]);
        assert_eq!(bands.red.upper_top, vec![500.0, 500.0]);
        assert!(bands.is_aligned(2));
    }

    #[test]
    fn sigma_bands_reject_misaligned_stds() {
        let t = SigmaThresholds { green_upper: 1.0, amber_upper: 2.0 };
        let err = sigma_bands(&[1.0, 2.0], &[1.0], &t, &AXIS).unwrap_err();
        assert_eq!(err, AnalyticsError::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn fitted_axis_keeps_red_outside_amber() {
        // An axis built from the values alone sits inside the amber curves.
        let expected = [100.0, 110.0];
        let narrow = AxisBounds::from_series(&[&expected[..]]);
        let mut bands = relative_error_bands(&expected, &thresholds(10.0, 20.0), &narrow);
        assert!(bands.red.upper_top[0] < bands.red.upper_bottom[0]);

        let axis = bands.fit_axis(&[&expected[..]]);
        assert!(axis.max >= 110.0 / 0.8);
        for i in 0..expected.len() {
            assert!(bands.red.upper_top[i] >= bands.red.upper_bottom[i]);
            assert!(bands.red.lower_bottom[i] <= bands.red.lower_top[i]);
        }
        assert!(bands.is_aligned(2));
    }

    #[test]
    fn empty_input_gives_empty_bands() {
        let bands = relative_error_bands(&[], &thresholds(5.0, 10.0), &AXIS);
        assert!(bands.is_empty());
        assert!(bands.is_aligned(0));
    }
}
