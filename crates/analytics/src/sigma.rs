use crate::selector::SelectExpected;
use core_types::{DataRecord, SummaryStats, finite};

/// `actual - expected`, or `None` when either side is missing or the result
/// is not finite.
pub fn residual<S: SelectExpected + ?Sized>(record: &DataRecord, selector: &S) -> Option<f64> {
    let actual = finite(record.actual)?;
    let expected = selector.select(record)?;
    Some(actual - expected).filter(|r| r.is_finite())
}

/// Mean and population standard deviation of the residual series.
///
/// Non-finite residuals are excluded from both the sums and the count. With
/// no usable residual the result is `{ mean: 0, std: 1 }`, and a zero std is
/// replaced with `1` so downstream divisions stay defined.
pub fn compute_residual_stats<S: SelectExpected + ?Sized>(
    records: &[DataRecord],
    selector: &S,
) -> SummaryStats {
    let residuals: Vec<f64> = records.iter().filter_map(|r| residual(r, selector)).collect();
    if residuals.is_empty() {
        return SummaryStats::default();
    }

    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let std = variance.sqrt();

    SummaryStats {
        mean,
        std: usable_std(std).unwrap_or(1.0),
    }
}

/// The volatility to measure `record` against: its own rolling std when one
/// is attached and usable, else the global estimate.
pub fn record_std(record: &DataRecord, global_std: f64) -> f64 {
    record
        .rolling_std
        .and_then(usable_std)
        .or_else(|| usable_std(global_std))
        .unwrap_or(1.0)
}

/// Per-record volatilities, aligned with `records`.
pub fn std_series(records: &[DataRecord], global_std: f64) -> Vec<f64> {
    records.iter().map(|r| record_std(r, global_std)).collect()
}

/// `|actual - expected| / std` per record, `None` where the residual is
/// undefined. Records carrying a rolling std are scored against it.
pub fn compute_z_scores<S: SelectExpected + ?Sized>(
    records: &[DataRecord],
    selector: &S,
    std: f64,
) -> Vec<Option<f64>> {
    records
        .iter()
        .map(|record| residual(record, selector).map(|r| r.abs() / record_std(record, std)))
        .collect()
}

fn usable_std(std: f64) -> Option<f64> {
    (std.is_finite() && std > 0.0).then_some(std)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ExpectedSelector;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn with_residual(r: f64) -> DataRecord {
        DataRecord::new(None, 100.0 + r, 100.0)
    }

    #[test]
    fn population_stats_of_residuals() {
        let records = vec![with_residual(10.0), with_residual(-10.0), with_residual(0.0)];
        let stats = compute_residual_stats(&records, &ExpectedSelector::Sigma);

        assert!(approx(stats.mean, 0.0));
        assert!(approx(stats.std, 8.165));
    }

    #[test]
    fn non_finite_residuals_are_excluded_from_count() {
        let records = vec![
            with_residual(4.0),
            DataRecord { actual: Some(f64::NAN), expected: Some(1.0), ..DataRecord::default() },
            DataRecord { actual: Some(3.0), ..DataRecord::default() },
            with_residual(-4.0),
        ];
        let stats = compute_residual_stats(&records, &ExpectedSelector::Sigma);

        assert!(approx(stats.mean, 0.0));
        assert!(approx(stats.std, 4.0));
    }

    #[test]
    fn empty_input_uses_safe_default() {
        let stats = compute_residual_stats(&[], &ExpectedSelector::Sigma);
        assert_eq!(stats, SummaryStats { mean: 0.0, std: 1.0 });
    }

    #[test]
    fn zero_spread_substitutes_unit_std() {
        let records = vec![with_residual(5.0), with_residual(5.0)];
        let stats = compute_residual_stats(&records, &ExpectedSelector::Sigma);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 1.0);
    }

    #[test]
    fn z_scores_use_global_std() {
        let records = vec![with_residual(-6.0), with_residual(3.0)];
        let z = compute_z_scores(&records, &ExpectedSelector::Sigma, 3.0);
        assert_eq!(z, vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn z_scores_prefer_rolling_std() {
        let mut volatile = with_residual(6.0);
        volatile.rolling_std = Some(6.0);
        let mut flat = with_residual(6.0);
        flat.rolling_std = Some(0.0);

        let z = compute_z_scores(&[volatile, flat], &ExpectedSelector::Sigma, 2.0);
        assert_eq!(z, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn z_score_missing_fields_are_none() {
        let records = vec![
            DataRecord { actual: Some(1.0), ..DataRecord::default() },
            DataRecord { expected: Some(1.0), ..DataRecord::default() },
        ];
        assert_eq!(compute_z_scores(&records, &ExpectedSelector::Sigma, 1.0), vec![None, None]);
    }

    #[test]
    fn degenerate_global_std_falls_back_to_one() {
        let record = with_residual(2.5);
        assert_eq!(record_std(&record, 0.0), 1.0);
        assert_eq!(record_std(&record, f64::NAN), 1.0);
    }
}
