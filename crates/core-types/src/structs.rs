use crate::enums::Zone;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Date formats accepted on incoming records, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

/// One observed period: the actual value plus every candidate prediction the
/// data source attached to it.
///
/// All numeric fields are optional because the loader makes no promise about
/// which ones are present. Consumers pick the prediction they need through an
/// explicit selector instead of guessing field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    /// Calendar date of the period. `None` when absent or unparseable; the
    /// record's position in the sequence then acts as its x coordinate.
    #[serde(default, deserialize_with = "deserialize_record_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub actual: Option<f64>,
    /// Primary prediction.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub expected: Option<f64>,
    /// Prediction derived from a rolling mean.
    #[serde(
        default,
        alias = "expected_rolling_mean",
        deserialize_with = "deserialize_lenient_number"
    )]
    pub expected_rolling: Option<f64>,
    /// Model-specific prediction.
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub expected_lstm: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub rolling_mean: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub rolling_std: Option<f64>,
}

impl DataRecord {
    /// Convenience constructor for the common dated actual/expected pair.
    pub fn new(date: Option<NaiveDate>, actual: f64, expected: f64) -> Self {
        Self {
            date,
            actual: Some(actual),
            expected: Some(expected),
            ..Self::default()
        }
    }

    /// The actual value, or `NaN` when the field is missing.
    pub fn actual_or_nan(&self) -> f64 {
        self.actual.unwrap_or(f64::NAN)
    }

    /// A label for the x axis: the ISO date, or `#<position>` for undated records.
    pub fn x_label(&self, position: usize) -> String {
        match self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => format!("#{position}"),
        }
    }
}

/// Returns the value only when it is present and finite.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Parses the date strings the loaders are known to produce. Timestamps are
/// truncated to their calendar date.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.date());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }
    tracing::debug!(date = raw, "Unrecognised record date; treating as undated.");
    None
}

/// A field value as loaders actually send it. Anything that is neither a
/// number nor a string is kept only so it can be ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

fn deserialize_record_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawField> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Text(text)) => parse_record_date(&text),
        // Compact numeric dates such as 20190331.
        Some(RawField::Number(n)) if n.fract() == 0.0 && n > 0.0 => {
            parse_record_date(&format!("{n:.0}"))
        }
        Some(_) | None => None,
    })
}

/// Accepts numbers and numeric strings. Any other value becomes `None`, so a
/// single bad cell costs one field rather than the whole dataset.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawField> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawField::Number(n)) => Some(n),
        Some(RawField::Text(text)) => {
            let parsed = text.trim().parse::<f64>().ok();
            if parsed.is_none() {
                tracing::debug!(value = %text, "Non-numeric record value; treating as missing.");
            }
            parsed
        }
        Some(RawField::Other(_)) | None => None,
    })
}

/// Number of observations falling into each zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub green: usize,
    pub amber: usize,
    pub red: usize,
    pub unknown: usize,
}

impl ZoneCounts {
    pub fn tally(zones: &[Zone]) -> Self {
        let mut counts = Self::default();
        for zone in zones {
            match zone {
                Zone::Green => counts.green += 1,
                Zone::Amber => counts.amber += 1,
                Zone::Red => counts.red += 1,
                Zone::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn get(&self, zone: Zone) -> usize {
        match zone {
            Zone::Green => self.green,
            Zone::Amber => self.amber,
            Zone::Red => self.red,
            Zone::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.green + self.amber + self.red + self.unknown
    }
}

/// Mean and population standard deviation of the residual series
/// `actual - expected`. `std` is never exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub std: f64,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }
}
