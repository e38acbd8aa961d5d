//! # Bandwatch Engine
//!
//! The orchestrator that turns typed input events into plot-ready snapshots.
//!
//! ## Architectural Principles
//!
//! - **Full recomputation:** Every event (dataset loaded, config applied, mode
//!   switched, filter changed, tolerance moved) reruns the whole pipeline from
//!   the raw records. Nothing intermediate is cached between events.
//! - **Copy-on-write config:** The active `ZoneConfig` is replaced wholesale
//!   behind an `Arc`, and only after it validates.
//! - **Request ordering:** Callers that interpose async work (a store fetch, a
//!   data download) take a `Ticket` up front; a result is discarded only when
//!   a newer request for the same input has already been applied.
//! - **Recover, then tell:** Empty filter results, missing fields and store
//!   failures never abort a recomputation. They are reported as `Notice`s.

// Declare the modules that constitute this crate.
pub mod error;
pub mod event;
pub mod notice;
pub mod orchestrator;
pub mod pipeline;
pub mod snapshot;
pub mod sync;

// Re-export the key components to create a clean, public-facing API.
pub use error::EngineError;
pub use event::{EngineEvent, EngineState, EventKind, Ticket};
pub use notice::Notice;
pub use orchestrator::{Orchestrator, Outcome};
pub use pipeline::{ComputeRequest, compute_snapshot};
pub use snapshot::Snapshot;
pub use sync::{SyncOutcome, fetch_config, persist_config};
