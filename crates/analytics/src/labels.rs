use crate::thresholds::{SigmaThresholds, Thresholds};
use core_types::{DataRecord, Zone};
use serde::{Deserialize, Serialize};

/// Legend entries summarising the active thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendLabels {
    pub green: String,
    pub amber: String,
    pub red: String,
}

impl LegendLabels {
    pub fn for_zone(&self, zone: Zone) -> Option<&str> {
        match zone {
            Zone::Green => Some(self.green.as_str()),
            Zone::Amber => Some(self.amber.as_str()),
            Zone::Red => Some(self.red.as_str()),
            Zone::Unknown => None,
        }
    }
}

/// Formats a threshold with at most two decimals and no trailing zeros.
fn num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

pub fn relative_error_legend(t: &Thresholds) -> LegendLabels {
    LegendLabels {
        green: format!("Green Zone (0–{}%)", num(t.level1_upper)),
        amber: format!("Amber Zone ({}–{}%)", num(t.level2_lower), num(t.level2_upper)),
        red: format!("Red Zone (>{}%)", num(t.level3_lower)),
    }
}

pub fn sigma_legend(t: &SigmaThresholds) -> LegendLabels {
    LegendLabels {
        green: format!("Green Zone (±{}σ)", num(t.green_upper)),
        amber: format!("Amber Zone (±{}–{}σ)", num(t.green_upper), num(t.amber_upper)),
        red: format!("Red Zone (>±{}σ)", num(t.amber_upper)),
    }
}

fn value_or_na(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

/// Hover text for a point in relative-error mode.
pub fn relative_error_hover(
    record: &DataRecord,
    position: usize,
    expected: f64,
    deviation: f64,
    zone: Zone,
) -> String {
    format!(
        "{}: actual {}, expected {}, deviation {}% ({})",
        record.x_label(position),
        value_or_na(record.actual),
        value_or_na(Some(expected)),
        value_or_na(Some(deviation)),
        zone,
    )
}

/// Hover text for a point in sigma mode.
pub fn sigma_hover(
    record: &DataRecord,
    position: usize,
    expected: f64,
    z_score: Option<f64>,
    std: f64,
    zone: Zone,
) -> String {
    format!(
        "{}: actual {}, expected {}, z-score {}σ (σ = {}) ({})",
        record.x_label(position),
        value_or_na(record.actual),
        value_or_na(Some(expected)),
        value_or_na(z_score),
        value_or_na(Some(std)),
        zone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn trims_threshold_numbers() {
        assert_eq!(num(20.0), "20");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn relative_legend_lists_percentages() {
        let t = Thresholds {
            level1_upper: 20.0,
            level2_lower: 20.0,
            level2_upper: 30.0,
            level3_lower: 30.0,
            level3_upper: 100.0,
        };
        let legend = relative_error_legend(&t);
        assert_eq!(legend.green, "Green Zone (0–20%)");
        assert_eq!(legend.amber, "Amber Zone (20–30%)");
        assert_eq!(legend.red, "Red Zone (>30%)");
        assert_eq!(legend.for_zone(Zone::Unknown), None);
    }

    #[test]
    fn sigma_legend_lists_multipliers() {
        let legend = sigma_legend(&SigmaThresholds { green_upper: 1.5, amber_upper: 3.0 });
        assert_eq!(legend.green, "Green Zone (±1.5σ)");
        assert_eq!(legend.red, "Red Zone (>±3σ)");
    }

    #[test]
    fn hover_describes_the_point() {
        let record = DataRecord::new(NaiveDate::from_ymd_opt(2020, 3, 31), 100.0, 90.0);
        let text = relative_error_hover(&record, 0, 90.0, 10.0, Zone::Green);
        assert_eq!(text, "2020-03-31: actual 100.00, expected 90.00, deviation 10.00% (Green)");

        let undated = DataRecord { actual: Some(5.0), ..DataRecord::default() };
        let text = sigma_hover(&undated, 4, f64::NAN, None, 2.0, Zone::Unknown);
        assert_eq!(text, "#4: actual 5.00, expected n/a, z-score n/aσ (σ = 2.00) (Unknown)");
    }
}
