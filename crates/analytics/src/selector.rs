use core_types::{DataRecord, DeviationMode, finite};
use serde::{Deserialize, Serialize};

/// Anything able to pick the prediction a record should be compared against.
///
/// Implemented by `ExpectedSelector` and by plain closures, so callers with an
/// unusual data source can supply their own resolution order.
pub trait SelectExpected {
    /// The prediction for `record`, or `None` when it has no usable value.
    fn select(&self, record: &DataRecord) -> Option<f64>;
}

impl<F> SelectExpected for F
where
    F: Fn(&DataRecord) -> Option<f64>,
{
    fn select(&self, record: &DataRecord) -> Option<f64> {
        self(record)
    }
}

/// A prediction field a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedField {
    Expected,
    ExpectedRolling,
    ExpectedLstm,
    RollingMean,
}

impl ExpectedField {
    pub fn read(&self, record: &DataRecord) -> Option<f64> {
        match self {
            ExpectedField::Expected => record.expected,
            ExpectedField::ExpectedRolling => record.expected_rolling,
            ExpectedField::ExpectedLstm => record.expected_lstm,
            ExpectedField::RollingMean => record.rolling_mean,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpectedField::Expected => "expected",
            ExpectedField::ExpectedRolling => "expected_rolling",
            ExpectedField::ExpectedLstm => "expected_lstm",
            ExpectedField::RollingMean => "rolling_mean",
        }
    }
}

const RELATIVE_ERROR_PRECEDENCE: [ExpectedField; 3] = [
    ExpectedField::ExpectedLstm,
    ExpectedField::Expected,
    ExpectedField::ExpectedRolling,
];

const SIGMA_PRECEDENCE: [ExpectedField; 3] = [
    ExpectedField::ExpectedRolling,
    ExpectedField::RollingMean,
    ExpectedField::Expected,
];

/// The named resolution strategy chosen once per mode activation.
///
/// Each variant walks a fixed precedence list and returns the first finite
/// value. A record with none of the fields yields `None`; there is no
/// silent default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedSelector {
    /// `expected_lstm`, else `expected`, else `expected_rolling`.
    RelativeError,
    /// `expected_rolling`, else `rolling_mean`, else `expected`.
    Sigma,
}

impl ExpectedSelector {
    pub fn for_mode(mode: DeviationMode) -> Self {
        match mode {
            DeviationMode::RelativeError => ExpectedSelector::RelativeError,
            DeviationMode::Sigma => ExpectedSelector::Sigma,
        }
    }

    /// The fields consulted, in order.
    pub fn precedence(&self) -> &'static [ExpectedField] {
        match self {
            ExpectedSelector::RelativeError => &RELATIVE_ERROR_PRECEDENCE,
            ExpectedSelector::Sigma => &SIGMA_PRECEDENCE,
        }
    }

    /// Which field supplied the prediction for `record`, if any.
    pub fn resolved_field(&self, record: &DataRecord) -> Option<ExpectedField> {
        self.precedence()
            .iter()
            .copied()
            .find(|field| finite(field.read(record)).is_some())
    }
}

impl SelectExpected for ExpectedSelector {
    fn select(&self, record: &DataRecord) -> Option<f64> {
        self.precedence()
            .iter()
            .find_map(|field| finite(field.read(record)))
    }
}

/// Resolves the prediction of every record, `NaN` where none is available.
pub fn expected_series<S: SelectExpected + ?Sized>(records: &[DataRecord], selector: &S) -> Vec<f64> {
    records
        .iter()
        .map(|record| selector.select(record).unwrap_or(f64::NAN))
        .collect()
}
