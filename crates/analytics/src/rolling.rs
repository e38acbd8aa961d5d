use crate::error::AnalyticsError;
use core_types::{DataRecord, finite};

/// Attaches a trailing rolling mean and population rolling std of `actual`
/// to each record, computed over the `window` records that precede it.
///
/// The rolling mean is a prediction for the record, so the record's own value
/// never enters its window. Records without a full window (or with fewer than
/// two finite actuals in it) get nothing. Values the source already supplied
/// are kept. A zero rolling std is left unset so the record falls back to the
/// global estimate. Returns a new vector; the input is untouched.
pub fn attach_rolling_stats(
    records: &[DataRecord],
    window: usize,
) -> Result<Vec<DataRecord>, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidWindow(window));
    }

    let enriched = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut out = record.clone();
            if i < window {
                return out;
            }
            let values: Vec<f64> = records[i - window..i]
                .iter()
                .filter_map(|r| finite(r.actual))
                .collect();
            if values.len() < 2 {
                return out;
            }

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            let std = variance.sqrt();

            if out.rolling_mean.is_none() {
                out.rolling_mean = Some(mean);
            }
            if out.rolling_std.is_none() && std > 0.0 {
                out.rolling_std = Some(std);
            }
            out
        })
        .collect();

    tracing::debug!(records = records.len(), window, "Attached rolling statistics.");
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuals(values: &[f64]) -> Vec<DataRecord> {
        values
            .iter()
            .map(|&v| DataRecord { actual: Some(v), ..DataRecord::default() })
            .collect()
    }

    #[test]
    fn rejects_tiny_windows() {
        assert_eq!(attach_rolling_stats(&[], 1), Err(AnalyticsError::InvalidWindow(1)));
    }

    #[test]
    fn uses_only_preceding_records() {
        let out = attach_rolling_stats(&actuals(&[2.0, 4.0, 100.0, 6.0]), 2).unwrap();

        assert_eq!(out[0].rolling_mean, None);
        assert_eq!(out[1].rolling_mean, None);
        assert_eq!(out[2].rolling_mean, Some(3.0));
        assert_eq!(out[2].rolling_std, Some(1.0));
        assert_eq!(out[3].rolling_mean, Some(52.0));
        assert_eq!(out[3].rolling_std, Some(48.0));
    }

    #[test]
    fn keeps_supplied_values_and_skips_flat_windows() {
        let mut records = actuals(&[5.0, 5.0, 5.0, 7.0]);
        records[3].rolling_mean = Some(1.5);

        let out = attach_rolling_stats(&records, 2).unwrap();
        assert_eq!(out[2].rolling_mean, Some(5.0));
        assert_eq!(out[2].rolling_std, None);
        assert_eq!(out[3].rolling_mean, Some(1.5));
        assert_eq!(out[3].rolling_std, None);
    }

    #[test]
    fn window_needs_two_finite_values() {
        let mut records = actuals(&[1.0, 0.0, 3.0]);
        records[1].actual = None;

        let out = attach_rolling_stats(&records, 2).unwrap();
        assert_eq!(out[2].rolling_mean, None);
        assert_eq!(out.len(), 3);
    }
}
