use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A recoverable condition met during a recomputation or a config sync.
///
/// Notices travel with the snapshot they affected. None of them stops
/// classification: the engine always falls back to something it can render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The period selection matched no record and was dropped.
    SelectionReset {
        years: BTreeSet<i32>,
        quarters: BTreeSet<u32>,
    },
    /// Records lacked the field the active mode needs; they classify as `Unknown`.
    MissingFields {
        count: usize,
        first_index: usize,
        field: &'static str,
    },
    ToleranceClamped { requested: f64, applied: f64 },
    /// The config store could not be reached; the last valid config stays.
    StoreUnavailable { reason: String },
    /// The config store returned values that fail validation.
    StoredConfigRejected { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SelectionReset { years, quarters } => write!(
                f,
                "No records match years {years:?} and quarters {quarters:?}; showing all records"
            ),
            Notice::MissingFields { count, first_index, field } => write!(
                f,
                "{count} record(s) have no usable '{field}' value (first at #{first_index}); shown as Unknown"
            ),
            Notice::ToleranceClamped { requested, applied } => {
                write!(f, "Tolerance {requested} is outside the slider bounds; using {applied}")
            }
            Notice::StoreUnavailable { reason } => {
                write!(f, "Config store unavailable ({reason}); keeping the last valid config")
            }
            Notice::StoredConfigRejected { reason } => {
                write!(f, "Stored config rejected ({reason}); keeping the last valid config")
            }
        }
    }
}
