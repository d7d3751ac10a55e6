//! Risk aggregation and derived advisories
//!
//! Combines the four per-hazard scores into an overall weighted score and a
//! fixed catalog of human-readable risk factors and recommendations. All
//! threshold checks run on pre-rounding values; display rounding is applied
//! only when the response is built.

use super::{Hazard, HazardScores};

/// Per-hazard score above which an advisory pair is emitted.
pub const ADVISORY_THRESHOLD: f64 = 6.0;

/// Overall risk as the fixed weighted sum of per-hazard scores.
///
/// Weights sum to 1.0 and are not configurable per request.
pub fn overall_risk(scores: &HazardScores) -> f64 {
    Hazard::ALL
        .iter()
        .map(|h| scores.get(*h) * h.weight())
        .sum()
}

/// Fixed factor/recommendation pair for one hazard.
fn advisory(hazard: Hazard) -> (&'static str, &'static str) {
    match hazard {
        Hazard::Flood => (
            "High flood risk due to weather conditions",
            "Monitor flood warnings and prepare evacuation routes",
        ),
        Hazard::Fire => (
            "Elevated fire danger from dry conditions",
            "Avoid outdoor burning and maintain defensible space",
        ),
        Hazard::Earthquake => (
            "Seismic activity in the region",
            "Secure heavy objects and review earthquake safety procedures",
        ),
        Hazard::Storm => (
            "Storm conditions developing",
            "Monitor weather alerts and secure outdoor items",
        ),
    }
}

const NORMAL_FACTOR: &str = "Normal environmental conditions";
const NORMAL_RECOMMENDATION: &str = "Continue regular disaster preparedness activities";

/// Risk factors and recommendations for the given scores.
///
/// Both lists are never empty: when no hazard crosses the threshold a single
/// normal-conditions pair is returned instead.
pub fn advisories(scores: &HazardScores) -> (Vec<String>, Vec<String>) {
    let mut factors = Vec::new();
    let mut recommendations = Vec::new();

    for hazard in Hazard::ALL {
        if scores.get(hazard) > ADVISORY_THRESHOLD {
            let (factor, rec) = advisory(hazard);
            factors.push(factor.to_string());
            recommendations.push(rec.to_string());
        }
    }

    if factors.is_empty() {
        factors.push(NORMAL_FACTOR.to_string());
        recommendations.push(NORMAL_RECOMMENDATION.to_string());
    }

    (factors, recommendations)
}

/// Display rounding for risk scores (one decimal place).
pub fn round_score(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Display rounding for confidence (two decimal places).
pub fn round_confidence(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(flood: f64, fire: f64, earthquake: f64, storm: f64) -> HazardScores {
        HazardScores { flood, fire, earthquake, storm }
    }

    #[test]
    fn test_overall_is_fixed_weighted_sum() {
        let s = scores(4.0, 2.0, 8.0, 6.0);
        let expected = 4.0 * 0.30 + 2.0 * 0.25 + 8.0 * 0.20 + 6.0 * 0.25;
        assert!((overall_risk(&s) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Hazard::ALL.iter().map(|h| h.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_calm_scores_emit_single_normal_pair() {
        let (factors, recs) = advisories(&scores(1.0, 6.0, 0.0, 5.9));
        assert_eq!(factors, vec![NORMAL_FACTOR.to_string()]);
        assert_eq!(recs, vec![NORMAL_RECOMMENDATION.to_string()]);
    }

    #[test]
    fn test_each_hazard_above_threshold_adds_one_pair() {
        let (factors, recs) = advisories(&scores(6.1, 1.0, 9.0, 6.5));
        assert_eq!(factors.len(), 3);
        assert_eq!(recs.len(), 3);
        assert!(factors.iter().any(|f| f.contains("flood")));
        assert!(factors.iter().any(|f| f.contains("Seismic")));
        assert!(factors.iter().any(|f| f.contains("Storm")));
    }

    #[test]
    fn test_threshold_uses_pre_rounding_values() {
        // 6.04 displays as 6.0 but must still trigger the advisory.
        let (factors, _) = advisories(&scores(6.04, 0.0, 0.0, 0.0));
        assert!(factors[0].contains("flood"));
        assert_eq!(round_score(6.04), 6.0);
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(round_score(3.14159), 3.1);
        assert_eq!(round_confidence(0.8571), 0.86);
    }
}
