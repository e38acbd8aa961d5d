use crate::selector::SelectExpected;
use core_types::DataRecord;

/// Deviation reported when the actual value is zero or unusable but a
/// non-zero prediction exists.
pub const MAX_RELATIVE_DEVIATION: f64 = 100.0;

/// Percentage deviation of `expected` from `actual`:
/// `|actual - expected| / |actual| * 100`.
///
/// A missing or non-finite prediction yields `NaN`, which classifies as
/// `Unknown`. A zero or non-finite actual yields `0` when the prediction is
/// also zero and `100` otherwise.
pub fn relative_deviation(actual: f64, expected: Option<f64>) -> f64 {
    let Some(expected) = expected.filter(|e| e.is_finite()) else {
        return f64::NAN;
    };
    if !actual.is_finite() || actual == 0.0 {
        return if expected == 0.0 { 0.0 } else { MAX_RELATIVE_DEVIATION };
    }
    (actual - expected).abs() / actual.abs() * 100.0
}

/// Relative-error deviation of every record, aligned 1:1 with the input.
pub fn compute_deviations<S: SelectExpected + ?Sized>(records: &[DataRecord], selector: &S) -> Vec<f64> {
    records
        .iter()
        .map(|record| relative_deviation(record.actual_or_nan(), selector.select(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ExpectedSelector;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_actual_edge_cases() {
        assert_eq!(relative_deviation(0.0, Some(0.0)), 0.0);
        assert_eq!(relative_deviation(0.0, Some(5.0)), 100.0);
        assert_eq!(relative_deviation(f64::NAN, Some(0.0)), 0.0);
        assert_eq!(relative_deviation(f64::INFINITY, Some(-3.0)), 100.0);
    }

    #[test]
    fn missing_prediction_is_nan() {
        assert!(relative_deviation(10.0, None).is_nan());
        assert!(relative_deviation(0.0, Some(f64::NAN)).is_nan());
    }

    #[test]
    fn deviation_is_relative_to_actual() {
        assert!(approx(relative_deviation(100.0, Some(90.0)), 10.0));
        assert!(approx(relative_deviation(-50.0, Some(-100.0)), 100.0));
        assert!(approx(relative_deviation(200.0, Some(250.0)), 25.0));
    }

    #[test]
    fn computes_in_input_order() {
        let records = vec![
            DataRecord::new(None, 100.0, 90.0),
            DataRecord::new(None, 50.0, 100.0),
            DataRecord { actual: Some(4.0), ..DataRecord::default() },
        ];
        let deviations = compute_deviations(&records, &ExpectedSelector::RelativeError);

        assert_eq!(deviations.len(), 3);
        assert!(approx(deviations[0], 10.0));
        assert!(approx(deviations[1], 100.0));
        assert!(deviations[2].is_nan());
    }
}
