use crate::error::EngineError;
use crate::notice::Notice;
use crate::snapshot::Snapshot;
use analytics::{
    ActiveThresholds, AxisBounds, ExpectedSelector, PeriodSelection, SelectExpected, SigmaThresholds,
    available_quarters, available_years, classify_deviations, classify_z_scores,
    compute_deviations, compute_residual_stats, compute_z_scores, expected_series,
    relative_error_bands, relative_error_hover, relative_error_legend, resolve_thresholds,
    sigma_bands, sigma_hover, sigma_legend, std_series,
};
use configuration::ZoneConfig;
use core_types::{CoreError, DataRecord, DeviationMode, ZoneCounts, finite};

/// The inputs of one recomputation. The config is assumed validated and the
/// tolerance offset already clamped.
#[derive(Debug, Clone, Copy)]
pub struct ComputeRequest<'a> {
    pub records: &'a [DataRecord],
    pub config: &'a ZoneConfig,
    pub mode: DeviationMode,
    pub selection: &'a PeriodSelection,
    pub tolerance_offset: f64,
}

/// Runs the whole pipeline: filter, measure, resolve thresholds, classify,
/// build bands, then package labels and counts.
///
/// Pure: the same request always produces the same snapshot. The returned
/// snapshot carries version 0; the orchestrator stamps it.
pub fn compute_snapshot(request: &ComputeRequest<'_>) -> Result<Snapshot, EngineError> {
    let mut notices = Vec::new();

    let outcome = request.selection.apply_or_reset(request.records);
    let selection = if outcome.reset {
        tracing::warn!(
            years = ?request.selection.years,
            quarters = ?request.selection.quarters,
            "Period selection matched no records; reverting to the full dataset."
        );
        notices.push(Notice::SelectionReset {
            years: request.selection.years.clone(),
            quarters: request.selection.quarters.clone(),
        });
        PeriodSelection::default()
    } else {
        request.selection.clone()
    };
    let records = outcome.records;

    let selector = ExpectedSelector::for_mode(request.mode);
    let expected = expected_series(&records, &selector);
    let actuals: Vec<f64> = records.iter().map(DataRecord::actual_or_nan).collect();
    // Provisional; refitted below once the band curves are known.
    let data_axis = AxisBounds::from_series(&[&actuals[..], &expected[..]]);
    let x_labels: Vec<String> = records.iter().enumerate().map(|(i, r)| r.x_label(i)).collect();

    let mut missing_count = 0;
    let mut first_missing = None;
    for (i, record) in records.iter().enumerate() {
        if let Some(err) = missing_field(record, i, request.mode, &selector) {
            missing_count += 1;
            first_missing.get_or_insert(err);
        }
    }
    if let Some(first @ CoreError::DataFieldMissing { index, field }) = &first_missing {
        tracing::debug!(count = missing_count, first = %first, "Records lack a usable field.");
        notices.push(Notice::MissingFields {
            count: missing_count,
            first_index: *index,
            field: *field,
        });
    }

    let (scores, zones, mut bands, thresholds, legend, hover, stats, deviation_axis_max) =
        match request.mode {
            DeviationMode::RelativeError => {
                let thresholds = resolve_thresholds(request.config, request.tolerance_offset);
                let deviations = compute_deviations(&records, &selector);
                let zones = classify_deviations(&deviations, &thresholds);
                let bands = relative_error_bands(&expected, &thresholds, &data_axis);
                let hover: Vec<String> = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| relative_error_hover(r, i, expected[i], deviations[i], zones[i]))
                    .collect();
                let scores: Vec<Option<f64>> = deviations
                    .iter()
                    .map(|d| Some(*d).filter(|d| d.is_finite()))
                    .collect();
                (
                    scores,
                    zones,
                    bands,
                    ActiveThresholds::RelativeError(thresholds),
                    relative_error_legend(&thresholds),
                    hover,
                    None,
                    Some(thresholds.level3_upper),
                )
            }
            DeviationMode::Sigma => {
                let thresholds = SigmaThresholds::from_config(request.config);
                let stats = compute_residual_stats(&records, &selector);
                let z_scores = compute_z_scores(&records, &selector, stats.std);
                let zones = classify_z_scores(&z_scores, &thresholds);
                let stds = std_series(&records, stats.std);
                let bands = sigma_bands(&expected, &stds, &thresholds, &data_axis)?;
                let hover: Vec<String> = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| sigma_hover(r, i, expected[i], z_scores[i], stds[i], zones[i]))
                    .collect();
                (
                    z_scores,
                    zones,
                    bands,
                    ActiveThresholds::Sigma(thresholds),
                    sigma_legend(&thresholds),
                    hover,
                    Some(stats),
                    None,
                )
            }
        };

    let axis = bands.fit_axis(&[&actuals[..], &expected[..]]);

    let counts = ZoneCounts::tally(&zones);
    tracing::debug!(
        mode = %request.mode,
        total = request.records.len(),
        shown = records.len(),
        green = counts.green,
        amber = counts.amber,
        red = counts.red,
        unknown = counts.unknown,
        "Zones recomputed."
    );

    Ok(Snapshot {
        version: 0,
        mode: request.mode,
        config: *request.config,
        tolerance_offset: request.tolerance_offset,
        selection,
        records,
        x_labels,
        expected,
        scores,
        zones,
        bands,
        thresholds,
        legend,
        hover,
        counts,
        stats,
        axis,
        deviation_axis_max,
        available_years: available_years(request.records),
        available_quarters: available_quarters(request.records),
        notices,
    })
}

/// The field a record lacks for the active mode, if any. Relative-error mode
/// has a defined result for an unusable actual, so only the prediction counts
/// there; sigma mode needs both.
fn missing_field(
    record: &DataRecord,
    index: usize,
    mode: DeviationMode,
    selector: &ExpectedSelector,
) -> Option<CoreError> {
    if mode == DeviationMode::Sigma && finite(record.actual).is_none() {
        return Some(CoreError::DataFieldMissing { index, field: "actual" });
    }
    if selector.select(record).is_none() {
        return Some(CoreError::DataFieldMissing { index, field: "expected" });
    }
    None
}
