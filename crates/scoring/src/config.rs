//! Tunable constants of the scoring pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: f64 },
}

/// Configuration for evidence collection and score aggregation.
///
/// `Default` gives the canonical values. Files loaded with
/// [`ScoringConfig::from_json`] may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplier for token-level matches
    pub token_weight: f64,
    /// Extra multiplier for negative token-level matches
    pub token_negative_damping: f64,
    /// Negative matches from labels at or below this probability are damped
    pub low_confidence_negative_threshold: f64,
    /// Damping applied to low-confidence negative matches
    pub low_confidence_negative_damping: f64,
    /// Dominant label must exceed this probability to trigger the negative penalty
    pub dominance_threshold: f64,
    /// Dominant negative penalty is `-multiplier * probability`
    pub dominant_negative_multiplier: f64,
    /// Diversity bonus per distinct category group
    pub category_diversity_weight: f64,
    /// Diversity bonus per distinct material group
    pub material_diversity_weight: f64,
    /// Diversity bonus per distinct feature group
    pub feature_diversity_weight: f64,
    /// Diversity bonus per distinct specific product
    pub product_diversity_weight: f64,
    /// Raw scores below this snap to zero
    pub noise_floor: f64,
    /// Number of distinct negative groups that triggers the cap
    pub negative_override_min_groups: usize,
    /// Cap applied to the scaled score under the negative override
    pub negative_override_cap: f64,
    /// Scaled score at or above which a product counts as eco-friendly
    pub eco_friendly_threshold: f64,
    /// Flat bonus per confirmed seller-declared attribute
    pub metadata_bonus: f64,
    /// Tokens must be longer than this many characters
    pub min_token_len: usize,
    /// Dominant probability above this is High confidence
    pub high_confidence_threshold: f64,
    /// Dominant probability above this is Medium confidence
    pub medium_confidence_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            token_weight: 0.7,
            token_negative_damping: 0.5,
            low_confidence_negative_threshold: 0.3,
            low_confidence_negative_damping: 0.5,
            dominance_threshold: 0.4,
            dominant_negative_multiplier: 2.0,
            category_diversity_weight: 0.10,
            material_diversity_weight: 0.15,
            feature_diversity_weight: 0.20,
            product_diversity_weight: 0.25,
            noise_floor: 0.1,
            negative_override_min_groups: 2,
            negative_override_cap: 3.0,
            eco_friendly_threshold: 2.5,
            metadata_bonus: 0.5,
            min_token_len: 2,
            high_confidence_threshold: 0.75,
            medium_confidence_threshold: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Load a (possibly partial) config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject weights and thresholds that are negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("token_weight", self.token_weight),
            ("token_negative_damping", self.token_negative_damping),
            ("low_confidence_negative_threshold", self.low_confidence_negative_threshold),
            ("low_confidence_negative_damping", self.low_confidence_negative_damping),
            ("dominance_threshold", self.dominance_threshold),
            ("dominant_negative_multiplier", self.dominant_negative_multiplier),
            ("category_diversity_weight", self.category_diversity_weight),
            ("material_diversity_weight", self.material_diversity_weight),
            ("feature_diversity_weight", self.feature_diversity_weight),
            ("product_diversity_weight", self.product_diversity_weight),
            ("noise_floor", self.noise_floor),
            ("negative_override_cap", self.negative_override_cap),
            ("eco_friendly_threshold", self.eco_friendly_threshold),
            ("metadata_bonus", self.metadata_bonus),
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("medium_confidence_threshold", self.medium_confidence_threshold),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }

        Ok(())
    }
}
