use crate::error::EngineError;
use crate::event::{EngineEvent, EngineState, EventKind, Ticket};
use crate::notice::Notice;
use crate::pipeline::{ComputeRequest, compute_snapshot};
use crate::snapshot::Snapshot;
use analytics::{AnalyticsError, PeriodSelection, attach_rolling_stats};
use configuration::ZoneConfig;
use core_types::{DataRecord, DeviationMode};
use std::collections::HashMap;
use std::sync::Arc;

/// What happened to a ticketed request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Applied(Arc<Snapshot>),
    /// A request for the same input issued later has already been applied;
    /// this one was dropped without touching any state.
    Discarded { ticket: Ticket, latest: Ticket },
}

impl Outcome {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Outcome::Applied(snapshot) => Some(snapshot),
            Outcome::Discarded { .. } => None,
        }
    }
}

/// Owns the engine inputs and the latest snapshot, and recomputes everything
/// on every event.
///
/// The config lives behind an `Arc` and is swapped wholesale, so a reader
/// holding the previous one never sees a half-applied update. Snapshots are
/// shared the same way.
pub struct Orchestrator {
    config: Arc<ZoneConfig>,
    mode: DeviationMode,
    selection: PeriodSelection,
    tolerance_offset: f64,
    dataset: Arc<Vec<DataRecord>>,
    rolling_window: Option<usize>,
    state: EngineState,
    next_ticket: u64,
    applied: HashMap<EventKind, Ticket>,
    version: u64,
    pending_notices: Vec<Notice>,
    snapshot: Arc<Snapshot>,
}

impl Orchestrator {
    /// Creates an engine with no data. The config must pass validation.
    pub fn new(config: ZoneConfig) -> Result<Self, EngineError> {
        let config = config.validate()?;
        let tolerance_offset = config.clamp_tolerance(0.0);
        let mode = DeviationMode::default();
        let selection = PeriodSelection::default();
        let snapshot = compute_snapshot(&ComputeRequest {
            records: &[],
            config: &config,
            mode,
            selection: &selection,
            tolerance_offset,
        })?;

        Ok(Self {
            config: Arc::new(config),
            mode,
            selection,
            tolerance_offset,
            dataset: Arc::new(Vec::new()),
            rolling_window: None,
            state: EngineState::Idle,
            next_ticket: 0,
            applied: HashMap::new(),
            version: 0,
            pending_notices: Vec::new(),
            snapshot: Arc::new(snapshot),
        })
    }

    /// Derives rolling mean and std over `window` preceding records for every
    /// dataset loaded from now on.
    pub fn with_rolling_window(mut self, window: usize) -> Result<Self, EngineError> {
        if window < 2 {
            return Err(AnalyticsError::InvalidWindow(window).into());
        }
        self.rolling_window = Some(window);
        Ok(self)
    }

    pub fn config(&self) -> Arc<ZoneConfig> {
        Arc::clone(&self.config)
    }

    pub fn mode(&self) -> DeviationMode {
        self.mode
    }

    pub fn selection(&self) -> &PeriodSelection {
        &self.selection
    }

    pub fn tolerance_offset(&self) -> f64 {
        self.tolerance_offset
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn dataset(&self) -> Arc<Vec<DataRecord>> {
        Arc::clone(&self.dataset)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Queues a notice raised outside the engine (e.g. by a config sync) so it
    /// is attached to the next snapshot.
    pub fn push_notice(&mut self, notice: Notice) {
        tracing::warn!(%notice, "Engine notice queued.");
        self.pending_notices.push(notice);
    }

    /// Starts a request. Take the ticket before any async step, and hand it
    /// back to `submit` along with the resulting event.
    pub fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Applies an event for a previously issued ticket, unless a later ticket
    /// of the same kind has already been applied. Results are ordered by
    /// request, not arrival; requests for different inputs never discard each
    /// other.
    pub fn submit(&mut self, ticket: Ticket, event: EngineEvent) -> Result<Outcome, EngineError> {
        let kind = event.kind();
        if let Some(&latest) = self.applied.get(&kind) {
            if ticket <= latest {
                tracing::debug!(%ticket, %latest, event = event.name(), "Discarding stale request.");
                return Ok(Outcome::Discarded { ticket, latest });
            }
        }
        let snapshot = self.apply(event)?;
        self.applied.insert(kind, ticket);
        Ok(Outcome::Applied(snapshot))
    }

    /// Applies an event immediately. Equivalent to issuing a ticket and
    /// submitting it at once.
    pub fn handle(&mut self, event: EngineEvent) -> Result<Arc<Snapshot>, EngineError> {
        let ticket = self.issue_ticket();
        let kind = event.kind();
        let snapshot = self.apply(event)?;
        self.applied.insert(kind, ticket);
        Ok(snapshot)
    }

    fn apply(&mut self, event: EngineEvent) -> Result<Arc<Snapshot>, EngineError> {
        tracing::debug!(event = event.name(), "Applying engine event.");
        match event {
            EngineEvent::DatasetLoaded(records) => {
                let records = match self.rolling_window {
                    Some(window) => attach_rolling_stats(&records, window)?,
                    None => records,
                };
                tracing::info!(records = records.len(), "Dataset loaded.");
                self.dataset = Arc::new(records);
            }
            EngineEvent::ConfigApplied(candidate) => {
                let config = candidate.validate().inspect_err(|e| {
                    tracing::warn!(error = %e, "Rejected config; keeping the previous one.");
                })?;
                self.config = Arc::new(config);
                self.tolerance_offset = config.clamp_tolerance(self.tolerance_offset);
            }
            EngineEvent::ModeSwitched(mode) => self.mode = mode,
            EngineEvent::FilterChanged(selection) => self.selection = selection,
            EngineEvent::ToleranceChanged(requested) => {
                let applied = self.config.clamp_tolerance(requested);
                if applied != requested {
                    self.push_notice(Notice::ToleranceClamped { requested, applied });
                }
                self.tolerance_offset = applied;
            }
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Result<Arc<Snapshot>, EngineError> {
        self.state = EngineState::Computing;
        let result = compute_snapshot(&ComputeRequest {
            records: &self.dataset,
            config: &self.config,
            mode: self.mode,
            selection: &self.selection,
            tolerance_offset: self.tolerance_offset,
        });
        self.state = EngineState::Idle;

        let mut snapshot = result?;
        if snapshot.selection_was_reset() {
            self.selection = PeriodSelection::default();
        }
        self.version += 1;
        snapshot.version = self.version;
        snapshot.notices.append(&mut self.pending_notices);

        self.snapshot = Arc::new(snapshot);
        Ok(Arc::clone(&self.snapshot))
    }
}
