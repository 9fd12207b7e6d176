//! Confidence scoring and output rounding.

use crate::scoring::ScoringDetails;
use crate::tier::CareTier;

pub const MIN_DETERMINISTIC_CONFIDENCE: f64 = 0.5;
pub const MAX_DETERMINISTIC_CONFIDENCE: f64 = 0.99;

/// Points from a tier boundary at which the boundary term saturates.
const BOUNDARY_SATURATION: f64 = 3.0;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round half up to an integer, for display.
pub(crate) fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Confidence of the deterministic path: 60% completeness, 40% distance
/// from the nearest boundary of `tier`'s score range. Clamped to [0.5, 0.99].
pub fn deterministic_confidence(details: &ScoringDetails, total_score: f64, tier: CareTier) -> f64 {
    let (min, max) = tier.threshold();
    let distance = (total_score - min).min(max - total_score);
    let boundary = (distance / BOUNDARY_SATURATION).min(1.0);
    let confidence = 0.6 * details.completeness() + 0.4 * boundary;

    if confidence.is_finite() {
        confidence.clamp(MIN_DETERMINISTIC_CONFIDENCE, MAX_DETERMINISTIC_CONFIDENCE)
    } else {
        MIN_DETERMINISTIC_CONFIDENCE
    }
}

/// Model confidence supersedes the deterministic value when present.
pub fn final_confidence(deterministic: f64, llm: Option<f64>) -> f64 {
    match llm {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => deterministic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(answered: usize, total: usize) -> ScoringDetails {
        ScoringDetails {
            required_answered: answered,
            required_total: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_record_confidence() {
        // 0 / max(0, 1) completeness, score 0 sits on the none boundary
        let c = deterministic_confidence(&details(0, 0), 0.0, CareTier::None);
        assert_eq!(c, 0.5);
    }

    #[test]
    fn test_confidence_formula() {
        // completeness 1.0, distance min(20-17, 24-20) = 3 → boundary 1.0
        let c = deterministic_confidence(&details(4, 4), 20.0, CareTier::AssistedLiving);
        assert_eq!(c, 0.99);

        // completeness 0.5, distance 1.5 → 0.3 + 0.2
        let c = deterministic_confidence(&details(2, 4), 10.5, CareTier::InHome);
        assert!((c - 0.5).abs() < 1e-9);

        // completeness 1.0, distance 1 → 0.6 + 0.1333
        let c = deterministic_confidence(&details(3, 3), 10.0, CareTier::InHome);
        assert!((c - 0.7333).abs() < 1e-3);
    }

    #[test]
    fn test_score_outside_tier_range_clamps() {
        let c = deterministic_confidence(&details(1, 1), 60.0, CareTier::InHome);
        assert_eq!(c, 0.5);
    }

    #[test]
    fn test_llm_confidence_supersedes() {
        assert_eq!(final_confidence(0.7, Some(0.93)), 0.93);
        assert_eq!(final_confidence(0.7, Some(1.4)), 1.0);
        assert_eq!(final_confidence(0.7, Some(f64::NAN)), 0.7);
        assert_eq!(final_confidence(0.7, None), 0.7);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round2(0.7333), 0.73);
        assert_eq!(round_display(12.5), 13);
        assert_eq!(round_display(12.49), 12);
    }
}
