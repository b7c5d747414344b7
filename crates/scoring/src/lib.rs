//! Eco-friendliness scoring.
//!
//! Takes classifier labels (and optional seller metadata), collects weighted
//! lexicon evidence, reduces it to a bounded 0-5 score and attaches the
//! explanation. Every function here is pure and synchronous: the same inputs
//! always give the same result, and calls may run concurrently against one
//! shared `Lexicon`.

mod aggregate;
mod config;
mod evidence;

pub use aggregate::{aggregate, confidence_level, diversity_bonus, rescale, MAX_SCORE};
pub use config::{ConfigError, ScoringConfig};
pub use evidence::collect;

use ecocert_explain::{detection_summary, recognized_elements, recommendations};
use ecocert_lexicon::Lexicon;
use ecocert_model::{
    ClassificationResult, EvidenceSet, LabelPrediction, ProductMetadata, ScoreBreakdown,
};

/// Run the full pipeline: collect, aggregate, explain.
pub fn classify(
    labels: &[LabelPrediction],
    metadata: Option<&ProductMetadata>,
    lexicon: &Lexicon,
    config: &ScoringConfig,
) -> ClassificationResult {
    let evidence = collect(labels, metadata, lexicon, config);
    let breakdown = aggregate(&evidence, config);
    assemble(labels, metadata, evidence, &breakdown)
}

/// Build the final result from evidence and its score breakdown.
pub fn assemble(
    labels: &[LabelPrediction],
    metadata: Option<&ProductMetadata>,
    evidence: EvidenceSet,
    breakdown: &ScoreBreakdown,
) -> ClassificationResult {
    let detection_summary = detection_summary(&evidence);
    let matched_features = recognized_elements(&evidence);
    let recommendations = recommendations(labels, &evidence, metadata);

    ClassificationResult {
        raw_score: breakdown.raw_score,
        scaled_score: breakdown.scaled_score,
        confidence: breakdown.confidence,
        rating: breakdown.rating,
        eco_friendly: breakdown.eco_friendly,
        detection_summary,
        matched_features,
        recommendations,
        matches: evidence.matches,
    }
}
