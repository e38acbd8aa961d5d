//! # Bandwatch Analytics
//!
//! The threshold classification and band computation core. Every function in
//! this crate is a pure transform: records and a validated config in, zones,
//! band curves and statistics out. Nothing here keeps state between calls.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** No knowledge of storage, rendering or input widgets.
//!   It depends only on `core-types` and `configuration`.
//! - **Two models, one pipeline:** Relative-error and sigma mode share the
//!   classifier and band nesting; they differ only in how a deviation is
//!   measured and how band edges are derived from thresholds.
//! - **Explicit prediction choice:** Which prediction field a record is compared
//!   against is decided by a named `ExpectedSelector`, never by inline fallbacks.
//!
//! ## Public API
//!
//! - Deviation measures: `compute_deviations`, `compute_residual_stats`, `compute_z_scores`.
//! - Boundaries: `resolve_thresholds`, `SigmaThresholds`, `ActiveThresholds`.
//! - Classification and bands: `classify_deviations`, `classify_z_scores`,
//!   `relative_error_bands`, `sigma_bands`, `BandSet`.
//! - Period filtering: `PeriodSelection`, `filter_by_years`, `filter_by_quarters`.

// Declare the modules that constitute this crate.
pub mod axis;
pub mod bands;
pub mod classifier;
pub mod deviation;
pub mod error;
pub mod labels;
pub mod rolling;
pub mod selector;
pub mod sigma;
pub mod temporal;
pub mod thresholds;

// Re-export the key components to create a clean, public-facing API.
pub use axis::AxisBounds;
pub use bands::{BandSet, GreenBand, OuterBand, RELATIVE_BAND_CAP_PCT, relative_error_bands, sigma_bands};
pub use classifier::{classify_deviations, classify_value, classify_z_scores};
pub use deviation::{compute_deviations, relative_deviation};
pub use error::AnalyticsError;
pub use labels::{LegendLabels, relative_error_hover, relative_error_legend, sigma_hover, sigma_legend};
pub use rolling::attach_rolling_stats;
pub use selector::{ExpectedField, ExpectedSelector, SelectExpected, expected_series};
pub use sigma::{compute_residual_stats, compute_z_scores, record_std, std_series};
pub use temporal::{
    FilterOutcome, PeriodSelection, available_quarters, available_years, filter_by_quarters,
    filter_by_years, quarter_of, year_of,
};
pub use thresholds::{ActiveThresholds, SigmaThresholds, Thresholds, resolve_thresholds};
