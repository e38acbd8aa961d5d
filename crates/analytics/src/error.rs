use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Rolling window must cover at least 2 records, got {0}")]
    InvalidWindow(usize),

    #[error("Invalid axis bounds: min {min} must be finite and below max {max}")]
    InvalidAxis { min: f64, max: f64 },

    #[error("Series length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
