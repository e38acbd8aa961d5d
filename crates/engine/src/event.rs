use analytics::PeriodSelection;
use configuration::ZoneConfig;
use core_types::{DataRecord, DeviationMode};
use std::fmt;

/// Every input that can change what the engine shows. Each one triggers a
/// full recomputation; there is no partial update path.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A new dataset replaces the previous one entirely.
    DatasetLoaded(Vec<DataRecord>),
    /// A candidate config. It is validated before it replaces anything.
    ConfigApplied(ZoneConfig),
    ModeSwitched(DeviationMode),
    FilterChanged(PeriodSelection),
    /// The tolerance slider moved. Clamped to the configured slider bounds.
    ToleranceChanged(f64),
}

/// The input an event replaces. Ticket ordering is tracked per kind, so a
/// late result only loses to a newer request for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Dataset,
    Config,
    Mode,
    Filter,
    Tolerance,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::DatasetLoaded(_) => EventKind::Dataset,
            EngineEvent::ConfigApplied(_) => EventKind::Config,
            EngineEvent::ModeSwitched(_) => EventKind::Mode,
            EngineEvent::FilterChanged(_) => EventKind::Filter,
            EngineEvent::ToleranceChanged(_) => EventKind::Tolerance,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::DatasetLoaded(_) => "dataset_loaded",
            EngineEvent::ConfigApplied(_) => "config_applied",
            EngineEvent::ModeSwitched(_) => "mode_switched",
            EngineEvent::FilterChanged(_) => "filter_changed",
            EngineEvent::ToleranceChanged(_) => "tolerance_changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Computing,
}

/// A request version. Tickets are handed out in increasing order when a
/// request starts, so results can be ordered by when they were asked for
/// rather than when they arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
