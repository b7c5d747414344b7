//! Score aggregation: evidence in, bounded 0-5 score out.

use ecocert_model::{ConfidenceLevel, EcoRating, EvidenceSet, ScoreBreakdown};

use crate::ScoringConfig;

/// Upper bound of the scaled score.
pub const MAX_SCORE: f64 = 5.0;

/// Reduce collected evidence to a score breakdown.
pub fn aggregate(evidence: &EvidenceSet, config: &ScoringConfig) -> ScoreBreakdown {
    let mut raw_score =
        evidence.dominant_negative_penalty + evidence.match_total() + evidence.metadata_bonus;

    // Strong negative evidence forfeits the diversity credit
    let diversity_withheld = raw_score <= 0.0 && evidence.has_negatives();
    let diversity_bonus = if diversity_withheld {
        0.0
    } else {
        diversity_bonus(evidence, config)
    };
    raw_score += diversity_bonus;

    if raw_score < config.noise_floor {
        raw_score = 0.0;
    }

    let mut scaled_score = rescale(raw_score);

    let negative_override = evidence.negatives.len() >= config.negative_override_min_groups
        && scaled_score > config.negative_override_cap;
    if negative_override {
        scaled_score = config.negative_override_cap;
    }

    let breakdown = ScoreBreakdown {
        raw_score,
        diversity_bonus,
        diversity_withheld,
        negative_override,
        scaled_score,
        confidence: confidence_level(evidence.dominant_probability, config),
        rating: EcoRating::from_score(scaled_score),
        eco_friendly: scaled_score >= config.eco_friendly_threshold,
    };

    tracing::debug!(
        raw_score = breakdown.raw_score,
        diversity_bonus = breakdown.diversity_bonus,
        diversity_withheld = breakdown.diversity_withheld,
        negative_override = breakdown.negative_override,
        scaled_score = breakdown.scaled_score,
        "Aggregated score"
    );

    breakdown
}

/// Credit for evidence spread across distinct groups.
pub fn diversity_bonus(evidence: &EvidenceSet, config: &ScoringConfig) -> f64 {
    evidence.categories.len() as f64 * config.category_diversity_weight
        + evidence.materials.len() as f64 * config.material_diversity_weight
        + evidence.features.len() as f64 * config.feature_diversity_weight
        + evidence.specific_products.len() as f64 * config.product_diversity_weight
}

/// Piecewise map of a raw score onto [0, 5].
///
/// | raw          | scaled                          |
/// |--------------|---------------------------------|
/// | <= 0         | 0                               |
/// | (0, 0.1)     | raw * 10                        |
/// | [0.1, 0.2)   | 1 + (raw - 0.1) * 15            |
/// | [0.2, 0.3)   | 2.5 + (raw - 0.2) * 10          |
/// | [0.3, 0.4)   | 3.5 + (raw - 0.3) * 10          |
/// | >= 0.4       | 4.5 + min(0.5, (raw - 0.4) * 5) |
pub fn rescale(raw: f64) -> f64 {
    let scaled = if raw.is_nan() || raw <= 0.0 {
        0.0
    } else if raw < 0.1 {
        raw * 10.0
    } else if raw < 0.2 {
        1.0 + (raw - 0.1) * 15.0
    } else if raw < 0.3 {
        2.5 + (raw - 0.2) * 10.0
    } else if raw < 0.4 {
        3.5 + (raw - 0.3) * 10.0
    } else {
        4.5 + ((raw - 0.4) * 5.0).min(0.5)
    };

    scaled.clamp(0.0, MAX_SCORE)
}

/// Confidence from the dominant label's probability.
pub fn confidence_level(dominant_probability: Option<f64>, config: &ScoringConfig) -> ConfidenceLevel {
    match dominant_probability {
        Some(p) if p > config.high_confidence_threshold => ConfidenceLevel::High,
        Some(p) if p > config.medium_confidence_threshold => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecocert_model::{EntryType, LexiconEntry, MatchRecord};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn record(score: f64, entry_type: EntryType) -> MatchRecord {
        MatchRecord {
            source_term: "term".into(),
            matched_entry: LexiconEntry::new("term", entry_type, "group"),
            weighted_score: score,
            source_probability: 1.0,
            from_token: false,
        }
    }

    #[test]
    fn test_rescale_breakpoints() {
        assert_eq!(rescale(-1.0), 0.0);
        assert_eq!(rescale(0.0), 0.0);
        assert_eq!(rescale(f64::NAN), 0.0);
        assert!(approx(rescale(0.05), 0.5));
        assert!(approx(rescale(0.1), 1.0));
        assert!(approx(rescale(0.15), 1.75));
        assert!(approx(rescale(0.2), 2.5));
        assert!(approx(rescale(0.25), 3.0));
        assert!(approx(rescale(0.3), 3.5));
        assert!(approx(rescale(0.35), 4.0));
        assert!(approx(rescale(0.4), 4.5));
        assert!(approx(rescale(0.45), 4.75));
        assert!(approx(rescale(0.5), 5.0));
        assert_eq!(rescale(100.0), 5.0);
        assert_eq!(rescale(f64::INFINITY), 5.0);
    }

    #[test]
    fn test_rescale_monotonic() {
        let mut previous = 0.0;
        for i in 0..=1000 {
            let scaled = rescale(i as f64 / 1000.0);
            assert!(scaled + 1e-12 >= previous, "rescale decreased at {}", i);
            assert!((0.0..=MAX_SCORE).contains(&scaled));
            previous = scaled;
        }
    }

    #[test]
    fn test_empty_evidence() {
        let breakdown = aggregate(&EvidenceSet::default(), &ScoringConfig::default());
        assert_eq!(breakdown.raw_score, 0.0);
        assert_eq!(breakdown.scaled_score, 0.0);
        assert_eq!(breakdown.confidence, ConfidenceLevel::Low);
        assert_eq!(breakdown.rating, EcoRating::NotEcoFriendly);
        assert!(!breakdown.eco_friendly);
    }

    #[test]
    fn test_noise_snaps_to_zero() {
        let evidence = EvidenceSet {
            matches: vec![record(0.05, EntryType::VisualIndicator)],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert_eq!(breakdown.raw_score, 0.0);
        assert_eq!(breakdown.scaled_score, 0.0);
    }

    #[test]
    fn test_diversity_bonus_weights() {
        let evidence = EvidenceSet {
            categories: vec!["a".into(), "b".into()],
            materials: vec!["m".into()],
            features: vec!["f".into()],
            specific_products: vec!["p".into()],
            ..Default::default()
        };
        assert!(approx(diversity_bonus(&evidence, &ScoringConfig::default()), 0.2 + 0.15 + 0.2 + 0.25));
    }

    #[test]
    fn test_diversity_withheld_when_negative_dominates() {
        let evidence = EvidenceSet {
            matches: vec![
                record(0.3, EntryType::Category),
                record(-0.8, EntryType::NegativeIndicator),
            ],
            categories: vec!["coffee_accessories".into()],
            negatives: vec!["vehicles".into()],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(breakdown.diversity_withheld);
        assert_eq!(breakdown.diversity_bonus, 0.0);
        assert_eq!(breakdown.raw_score, 0.0);
    }

    #[test]
    fn test_diversity_granted_with_negatives_when_positive() {
        let evidence = EvidenceSet {
            matches: vec![
                record(0.15, EntryType::Category),
                record(-0.1, EntryType::NegativeIndicator),
            ],
            categories: vec!["coffee_accessories".into()],
            negatives: vec!["vehicles".into()],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(!breakdown.diversity_withheld);
        assert!(approx(breakdown.diversity_bonus, 0.1));
        assert!(approx(breakdown.raw_score, 0.15));
        assert!(approx(breakdown.scaled_score, 1.75));
    }

    #[test]
    fn test_diversity_granted_at_zero_without_negatives() {
        // raw is exactly zero but no negative group was seen
        let evidence = EvidenceSet {
            categories: vec!["coffee_accessories".into()],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(!breakdown.diversity_withheld);
        assert!(approx(breakdown.raw_score, 0.1));
        assert!(approx(breakdown.scaled_score, 1.0));
    }

    #[test]
    fn test_negative_override_caps_score() {
        let evidence = EvidenceSet {
            matches: vec![record(2.0, EntryType::SpecificProduct), record(-0.2, EntryType::NegativeIndicator)],
            negatives: vec!["vehicles".into(), "electronics".into()],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(breakdown.negative_override);
        assert_eq!(breakdown.scaled_score, 3.0);
        assert!(breakdown.eco_friendly);
        assert_eq!(breakdown.rating, EcoRating::Likely);
    }

    #[test]
    fn test_single_negative_group_not_capped() {
        let evidence = EvidenceSet {
            matches: vec![record(2.0, EntryType::SpecificProduct), record(-0.2, EntryType::NegativeIndicator)],
            negatives: vec!["vehicles".into()],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(!breakdown.negative_override);
        assert_eq!(breakdown.scaled_score, 5.0);
    }

    #[test]
    fn test_eco_threshold_inclusive() {
        let evidence = EvidenceSet {
            matches: vec![record(0.2, EntryType::Category)],
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(approx(breakdown.scaled_score, 2.5));
        assert!(breakdown.eco_friendly);
    }

    #[test]
    fn test_dominant_penalty_counts_toward_raw() {
        let evidence = EvidenceSet {
            matches: vec![record(1.0, EntryType::Category)],
            dominant_negative_penalty: -0.8,
            ..Default::default()
        };
        let breakdown = aggregate(&evidence, &ScoringConfig::default());
        assert!(approx(breakdown.raw_score, 0.2));
    }

    #[test]
    fn test_confidence_levels() {
        let config = ScoringConfig::default();
        assert_eq!(confidence_level(Some(0.9), &config), ConfidenceLevel::High);
        assert_eq!(confidence_level(Some(0.75), &config), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(Some(0.51), &config), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(Some(0.5), &config), ConfidenceLevel::Low);
        assert_eq!(confidence_level(None, &config), ConfidenceLevel::Low);
    }
}
