use chrono::{Datelike, NaiveDate};
use core_types::DataRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub fn year_of(date: NaiveDate) -> i32 {
    date.year()
}

/// Calendar quarter, 1-based: January to March is 1.
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Keeps records dated in one of `years`. Undated records are dropped, unless
/// `years` is empty, in which case the input comes back unchanged.
pub fn filter_by_years(records: &[DataRecord], years: &BTreeSet<i32>) -> Vec<DataRecord> {
    if years.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.date.is_some_and(|d| years.contains(&year_of(d))))
        .cloned()
        .collect()
}

/// Keeps records dated in one of `quarters`, with the same rules as
/// `filter_by_years`.
pub fn filter_by_quarters(records: &[DataRecord], quarters: &BTreeSet<u32>) -> Vec<DataRecord> {
    if quarters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.date.is_some_and(|d| quarters.contains(&quarter_of(d))))
        .cloned()
        .collect()
}

/// A multi-select over years and quarters. Both parts apply together: a
/// record must match a selected year AND a selected quarter. An empty part
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub years: BTreeSet<i32>,
    pub quarters: BTreeSet<u32>,
}

impl PeriodSelection {
    pub fn new(years: impl IntoIterator<Item = i32>, quarters: impl IntoIterator<Item = u32>) -> Self {
        Self {
            years: years.into_iter().collect(),
            quarters: quarters.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.quarters.is_empty()
    }

    pub fn apply(&self, records: &[DataRecord]) -> Vec<DataRecord> {
        let by_year = filter_by_years(records, &self.years);
        filter_by_quarters(&by_year, &self.quarters)
    }

    /// Applies the selection, reverting to the unfiltered records when it
    /// matches nothing.
    pub fn apply_or_reset(&self, records: &[DataRecord]) -> FilterOutcome {
        let filtered = self.apply(records);
        if filtered.is_empty() && !records.is_empty() {
            return FilterOutcome {
                records: records.to_vec(),
                reset: true,
            };
        }
        FilterOutcome {
            records: filtered,
            reset: false,
        }
    }
}

/// Result of filtering with the empty-result fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub records: Vec<DataRecord>,
    /// True when the selection matched nothing and was discarded.
    pub reset: bool,
}

/// Distinct years present in the data, for populating a selection UI.
pub fn available_years(records: &[DataRecord]) -> BTreeSet<i32> {
    records.iter().filter_map(|r| r.date).map(year_of).collect()
}

/// Distinct quarters present in the data.
pub fn available_quarters(records: &[DataRecord]) -> BTreeSet<u32> {
    records.iter().filter_map(|r| r.date).map(quarter_of).collect()
}
