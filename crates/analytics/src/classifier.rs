use crate::thresholds::{SigmaThresholds, Thresholds};
use core_types::Zone;

/// Maps a deviation to its zone. Boundaries belong to the less severe zone:
/// a value exactly at `green_limit` is green, exactly at `amber_limit` is amber.
/// Non-finite values are `Unknown`.
pub fn classify_value(value: f64, green_limit: f64, amber_limit: f64) -> Zone {
    if !value.is_finite() {
        Zone::Unknown
    } else if value <= green_limit {
        Zone::Green
    } else if value <= amber_limit {
        Zone::Amber
    } else {
        Zone::Red
    }
}

/// Classifies relative-error deviations (percent).
pub fn classify_deviations(deviations: &[f64], thresholds: &Thresholds) -> Vec<Zone> {
    deviations
        .iter()
        .map(|&d| classify_value(d, thresholds.level1_upper, thresholds.level2_upper))
        .collect()
}

/// Classifies z-scores. A missing score is `Unknown`.
pub fn classify_z_scores(z_scores: &[Option<f64>], thresholds: &SigmaThresholds) -> Vec<Zone> {
    z_scores
        .iter()
        .map(|z| match z {
            Some(z) => classify_value(*z, thresholds.green_upper, thresholds.amber_upper),
            None => Zone::Unknown,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Thresholds = Thresholds {
        level1_upper: 20.0,
        level2_lower: 20.0,
        level2_upper: 30.0,
        level3_lower: 30.0,
        level3_upper: 100.0,
    };

    #[test]
    fn boundaries_belong_to_the_lower_zone() {
        let zones = classify_deviations(&[20.0, 20.000_001, 30.0, 30.000_001], &T);
        assert_eq!(zones, vec![Zone::Green, Zone::Amber, Zone::Amber, Zone::Red]);
    }

    #[test]
    fn non_finite_is_unknown_never_green() {
        let zones = classify_deviations(&[f64::NAN, f64::INFINITY, 0.0], &T);
        assert_eq!(zones, vec![Zone::Unknown, Zone::Unknown, Zone::Green]);
    }

    #[test]
    fn sigma_uses_same_inclusive_structure() {
        let t = SigmaThresholds { green_upper: 1.0, amber_upper: 2.0 };
        let zones = classify_z_scores(&[Some(1.0), Some(1.5), Some(2.0), Some(2.1), None], &t);
        assert_eq!(
            zones,
            vec![Zone::Green, Zone::Amber, Zone::Amber, Zone::Red, Zone::Unknown]
        );
    }
}
