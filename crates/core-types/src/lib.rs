pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{DeviationMode, Zone};
pub use error::CoreError;
pub use structs::{DataRecord, SummaryStats, ZoneCounts, finite, parse_record_date};
