use crate::error::EngineError;
use crate::notice::Notice;
use analytics::{ActiveThresholds, AxisBounds, BandSet, LegendLabels, PeriodSelection};
use configuration::ZoneConfig;
use core_types::{DataRecord, DeviationMode, SummaryStats, Zone, ZoneCounts};
use serde::Serialize;
use std::collections::BTreeSet;

/// Everything the rendering layer needs for one recomputation.
///
/// Every per-point sequence (`records`, `x_labels`, `expected`, `scores`,
/// `zones`, `hover` and each band edge) has the same length and the same
/// order. Non-finite numbers serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Increases by one with every accepted recomputation.
    pub version: u64,
    pub mode: DeviationMode,
    pub config: ZoneConfig,
    pub tolerance_offset: f64,
    /// The selection actually in force; empty after a reset.
    pub selection: PeriodSelection,
    /// The filtered records, in input order.
    pub records: Vec<DataRecord>,
    pub x_labels: Vec<String>,
    /// The prediction each record was measured against, `NaN` where missing.
    pub expected: Vec<f64>,
    /// Percentage deviation in relative-error mode, z-score in sigma mode.
    pub scores: Vec<Option<f64>>,
    pub zones: Vec<Zone>,
    pub bands: BandSet,
    pub thresholds: ActiveThresholds,
    pub legend: LegendLabels,
    pub hover: Vec<String>,
    pub counts: ZoneCounts,
    /// Residual statistics; sigma mode only.
    pub stats: Option<SummaryStats>,
    pub axis: AxisBounds,
    /// Suggested maximum of the deviation axis; relative-error mode only.
    pub deviation_axis_max: Option<f64>,
    /// Years and quarters present in the whole dataset, before filtering.
    pub available_years: BTreeSet<i32>,
    pub available_quarters: BTreeSet<u32>,
    pub notices: Vec<Notice>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True when the selection was dropped because it matched nothing.
    pub fn selection_was_reset(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::SelectionReset { .. }))
    }
}
