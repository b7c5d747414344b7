//! Evidence collection: classifier labels and seller metadata in, weighted
//! matches and distinct group sets out.

use ecocert_lexicon::{Lexicon, CERTIFICATIONS_GROUP, SUSTAINABLE_MATERIALS_GROUP};
use ecocert_matcher::{match_group, match_term, normalize_term, tokenize, MatchKind, TermMatch};
use ecocert_model::{
    DeclaredAttribute, DeclaredKind, EntryType, EvidenceSet, LabelPrediction, MatchRecord,
    ProductMetadata,
};

use crate::ScoringConfig;

/// Collect evidence from classifier labels and optional seller metadata.
///
/// `labels` must be sorted by descending probability; the first label is
/// treated as the dominant prediction. Labels with a zero (or invalid)
/// probability contribute nothing.
pub fn collect(
    labels: &[LabelPrediction],
    metadata: Option<&ProductMetadata>,
    lexicon: &Lexicon,
    config: &ScoringConfig,
) -> EvidenceSet {
    let mut evidence = EvidenceSet::default();

    for prediction in labels {
        let probability = checked_probability(prediction);
        if probability == 0.0 {
            continue;
        }

        let label = normalize_term(&prediction.label);

        let short_label = label.chars().count() <= config.min_token_len;
        for m in match_term(&label, lexicon) {
            // Fragments must not match inside longer entries
            if short_label && m.kind == MatchKind::EntryContainsTerm {
                continue;
            }
            let weighted = weigh(&m, probability, false, config);
            record(&mut evidence, &label, &m, weighted, probability, false);
        }

        for token in tokenize(&label) {
            if token.chars().count() <= config.min_token_len {
                continue;
            }
            for m in match_term(token, lexicon) {
                let weighted = weigh(&m, probability, true, config);
                record(&mut evidence, token, &m, weighted, probability, true);
            }
        }
    }

    if let Some(dominant) = labels.first() {
        let probability = dominant.sanitized_probability();
        evidence.dominant_probability = Some(probability);
        evidence.dominant_negative_penalty =
            dominant_negative_penalty(dominant, probability, lexicon, config);
    }

    if let Some(metadata) = metadata {
        collect_declared(&mut evidence, metadata, lexicon, config);
    }

    tracing::debug!(
        labels = labels.len(),
        matches = evidence.matches.len(),
        negatives = evidence.negatives.len(),
        dominant_penalty = evidence.dominant_negative_penalty,
        metadata_bonus = evidence.metadata_bonus,
        "Collected evidence"
    );

    evidence
}

fn checked_probability(prediction: &LabelPrediction) -> f64 {
    if !prediction.has_valid_probability() {
        tracing::warn!(
            label = %prediction.label,
            probability = prediction.probability,
            "Invalid label probability, treating as 0"
        );
    }
    prediction.sanitized_probability()
}

/// Weight a raw match by label probability and apply negative damping.
fn weigh(m: &TermMatch<'_>, probability: f64, from_token: bool, config: &ScoringConfig) -> f64 {
    let mut weighted = m.score * probability;
    if from_token {
        weighted *= config.token_weight;
    }

    if m.entry.entry_type.is_negative() {
        if probability <= config.low_confidence_negative_threshold {
            weighted *= config.low_confidence_negative_damping;
        }
        if from_token {
            weighted *= config.token_negative_damping;
        }
    }

    weighted
}

fn insert_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn record(
    evidence: &mut EvidenceSet,
    source_term: &str,
    m: &TermMatch<'_>,
    weighted: f64,
    probability: f64,
    from_token: bool,
) {
    let entry = m.entry;
    match entry.entry_type {
        EntryType::Category => insert_distinct(&mut evidence.categories, &entry.group_name),
        EntryType::Material => insert_distinct(&mut evidence.materials, &entry.group_name),
        EntryType::Feature => insert_distinct(&mut evidence.features, &entry.group_name),
        EntryType::SpecificProduct => insert_distinct(&mut evidence.specific_products, &entry.text),
        EntryType::NegativeIndicator => insert_distinct(&mut evidence.negatives, &entry.group_name),
        EntryType::VisualIndicator => {}
    }

    tracing::trace!(
        term = %source_term,
        entry = %entry.text,
        kind = ?m.kind,
        weighted,
        "Recorded match"
    );

    evidence.matches.push(MatchRecord {
        source_term: source_term.to_string(),
        matched_entry: entry.clone(),
        weighted_score: weighted,
        source_probability: probability,
        from_token,
    });
}

/// Extra penalty when the dominant label is itself a confident negative.
fn dominant_negative_penalty(
    dominant: &LabelPrediction,
    probability: f64,
    lexicon: &Lexicon,
    config: &ScoringConfig,
) -> f64 {
    if probability <= config.dominance_threshold {
        return 0.0;
    }

    let is_negative = match_term(&dominant.label, lexicon)
        .iter()
        .any(|m| m.entry.entry_type.is_negative());

    if is_negative {
        -config.dominant_negative_multiplier * probability
    } else {
        0.0
    }
}

/// Confirm seller-declared materials and certifications against the lexicon.
fn collect_declared(
    evidence: &mut EvidenceSet,
    metadata: &ProductMetadata,
    lexicon: &Lexicon,
    config: &ScoringConfig,
) {
    let checks = [
        (DeclaredKind::Material, &metadata.materials, SUSTAINABLE_MATERIALS_GROUP),
        (DeclaredKind::Certification, &metadata.certifications, CERTIFICATIONS_GROUP),
    ];

    for (kind, values, group_name) in checks {
        let Some(group) = lexicon.group(group_name) else {
            tracing::debug!(group = group_name, "Lexicon has no group for declared attributes");
            continue;
        };

        let mut seen: Vec<String> = Vec::new();
        for value in values {
            let normalized = normalize_term(value);
            if normalized.is_empty() || seen.contains(&normalized) {
                continue;
            }
            seen.push(normalized);

            // Declared values confirm an entry only by naming it
            let confirmed = match_group(value, group)
                .into_iter()
                .find(|m| m.kind != MatchKind::EntryContainsTerm);

            if let Some(m) = confirmed {
                evidence.declared.push(DeclaredAttribute {
                    kind,
                    value: value.trim().to_string(),
                    matched: m.entry.text.clone(),
                });
                evidence.metadata_bonus += config.metadata_bonus;
            }
        }
    }
}
