//! Core domain model for EcoCert product classification.
//!
//! This crate defines the fundamental types shared by every pipeline stage:
//! - `LexiconEntry`: One term of the eco-relevance taxonomy
//! - `LabelPrediction`: A (label, probability) pair from the image classifier
//! - `MatchRecord` / `EvidenceSet`: What the evidence collector found
//! - `ClassificationResult`: The final, render-ready verdict

use serde::{Deserialize, Serialize};

/// Kind of a lexicon entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Product category keyword ("mug", "tote")
    Category,
    /// Sustainable material or plastic alternative
    Material,
    /// Certification or eco attribute
    Feature,
    /// Evidence that the photo is not an eco product at all
    NegativeIndicator,
    /// Literal eco product phrase ("reusable coffee pod")
    SpecificProduct,
    /// Generic object common in eco product photos
    VisualIndicator,
}

impl EntryType {
    /// Score awarded for an exact match against an entry of this type.
    pub fn max_score(&self) -> f64 {
        match self {
            Self::Category => 1.0,
            Self::Material => 1.2,
            Self::Feature => 1.5,
            Self::NegativeIndicator => -1.5,
            Self::SpecificProduct => 2.0,
            Self::VisualIndicator => 1.0,
        }
    }

    /// Human-readable label for this type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Category => "Categories",
            Self::Material => "Materials",
            Self::Feature => "Features",
            Self::NegativeIndicator => "Non-eco indicators",
            Self::SpecificProduct => "Products",
            Self::VisualIndicator => "Visual cues",
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::NegativeIndicator)
    }
}

/// A single term of the lexicon.
///
/// Entries are immutable once built. `text` is always lower case and
/// `base_score` always equals `entry_type.max_score()`, so a negative
/// indicator can never carry a positive score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Lower-cased term text
    pub text: String,

    /// Kind of evidence this term represents
    pub entry_type: EntryType,

    /// Name of the group the term belongs to (e.g. "coffee_accessories")
    pub group_name: String,

    /// Score for an exact match
    pub base_score: f64,
}

impl LexiconEntry {
    pub fn new(text: &str, entry_type: EntryType, group_name: impl Into<String>) -> Self {
        Self {
            text: text.trim().to_lowercase(),
            entry_type,
            group_name: group_name.into(),
            base_score: entry_type.max_score(),
        }
    }
}

/// One prediction from the external image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    /// Predicted label text (MobileNet calls this `className`)
    #[serde(alias = "className")]
    pub label: String,

    /// Probability in [0, 1]
    pub probability: f64,
}

impl LabelPrediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }

    /// Whether the probability is a finite value inside [0, 1].
    pub fn has_valid_probability(&self) -> bool {
        self.probability.is_finite() && (0.0..=1.0).contains(&self.probability)
    }

    /// Probability with invalid values (NaN, out of range) replaced by 0.
    pub fn sanitized_probability(&self) -> f64 {
        if self.has_valid_probability() {
            self.probability
        } else {
            0.0
        }
    }
}

/// Seller-supplied product attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(default)]
    pub materials: Vec<String>,

    #[serde(default)]
    pub certifications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductMetadata {
    pub fn with_materials(mut self, materials: &[&str]) -> Self {
        self.materials = materials.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_certifications(mut self, certifications: &[&str]) -> Self {
        self.certifications = certifications.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A weighted match of one label (or label token) against one lexicon entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The label or token that produced the match
    pub source_term: String,

    /// The entry it matched
    pub matched_entry: LexiconEntry,

    /// Match score after probability weighting and damping
    pub weighted_score: f64,

    /// Probability of the label the term came from
    pub source_probability: f64,

    /// Whether `source_term` is a token of the label rather than the whole label
    #[serde(default)]
    pub from_token: bool,
}

impl MatchRecord {
    pub fn is_positive(&self) -> bool {
        self.weighted_score > 0.0
    }
}

/// Which seller-declared list an attribute came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredKind {
    Material,
    Certification,
}

/// A seller-declared attribute confirmed by the lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredAttribute {
    pub kind: DeclaredKind,

    /// Declared value as the seller wrote it
    pub value: String,

    /// Lexicon term that confirmed it
    pub matched: String,
}

/// Everything the evidence collector gathered for one classification call.
///
/// Group lists hold distinct values in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSet {
    /// Every match, in production order (whole label before its tokens)
    pub matches: Vec<MatchRecord>,

    /// Distinct category groups
    pub categories: Vec<String>,

    /// Distinct material groups
    pub materials: Vec<String>,

    /// Distinct feature groups
    pub features: Vec<String>,

    /// Distinct specific product phrases
    pub specific_products: Vec<String>,

    /// Distinct negative-indicator groups
    pub negatives: Vec<String>,

    /// Probability of the first (dominant) label, if any label was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_probability: Option<f64>,

    /// Extra penalty for a confident negative dominant label (zero or negative)
    #[serde(default)]
    pub dominant_negative_penalty: f64,

    /// Seller-declared attributes confirmed by the lexicon
    #[serde(default)]
    pub declared: Vec<DeclaredAttribute>,

    /// Flat bonus earned by `declared`
    #[serde(default)]
    pub metadata_bonus: f64,
}

impl EvidenceSet {
    /// Sum of all weighted match scores.
    pub fn match_total(&self) -> f64 {
        self.matches.iter().map(|m| m.weighted_score).sum()
    }

    /// True when nothing at all was found.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.declared.is_empty() && self.dominant_negative_penalty == 0.0
    }

    pub fn has_negatives(&self) -> bool {
        !self.negatives.is_empty()
    }
}

/// Confidence in the classifier's dominant prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Qualitative eco rating derived from the 0-5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcoRating {
    /// score < 0.5
    NotEcoFriendly,
    /// 0.5 <= score < 1.5
    Unlikely,
    /// 1.5 <= score < 2.5
    Possible,
    /// 2.5 <= score < 3.5
    Likely,
    /// 3.5 <= score < 4.5
    HighlyLikely,
    /// score >= 4.5
    Confirmed,
}

impl EcoRating {
    /// Map an unrounded scaled score onto a rating.
    pub fn from_score(score: f64) -> Self {
        if score < 0.5 {
            Self::NotEcoFriendly
        } else if score < 1.5 {
            Self::Unlikely
        } else if score < 2.5 {
            Self::Possible
        } else if score < 3.5 {
            Self::Likely
        } else if score < 4.5 {
            Self::HighlyLikely
        } else {
            Self::Confirmed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotEcoFriendly => "Not eco-friendly",
            Self::Unlikely => "Unlikely eco-friendly",
            Self::Possible => "Possible eco-friendly product",
            Self::Likely => "Likely eco-friendly product",
            Self::HighlyLikely => "Highly likely eco-friendly product",
            Self::Confirmed => "Confirmed eco-friendly product",
        }
    }
}

/// Numeric outcome of score aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Raw score after diversity bonus and noise snapping
    pub raw_score: f64,

    /// Diversity bonus that was added (0 when withheld)
    pub diversity_bonus: f64,

    /// Whether negative evidence withheld the diversity bonus
    pub diversity_withheld: bool,

    /// Whether the multi-negative cap lowered the score
    pub negative_override: bool,

    /// Unrounded score in [0, 5]
    pub scaled_score: f64,

    pub confidence: ConfidenceLevel,

    pub rating: EcoRating,

    pub eco_friendly: bool,
}

/// Final verdict for one classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub raw_score: f64,

    /// Unrounded score in [0, 5]; use `display_score` for rendering
    pub scaled_score: f64,

    pub confidence: ConfidenceLevel,

    pub rating: EcoRating,

    pub eco_friendly: bool,

    /// Ordered explanation lines
    pub detection_summary: Vec<String>,

    /// Labels/tokens that produced positive evidence, first-seen order
    pub matched_features: Vec<String>,

    /// Advice for the seller
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Every match behind the score
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl ClassificationResult {
    /// Score rounded to one decimal place.
    pub fn display_score(&self) -> f64 {
        (self.scaled_score * 10.0).round() / 10.0
    }

    /// Number of fully earned stars out of five.
    pub fn filled_stars(&self) -> u8 {
        self.display_score().floor().clamp(0.0, 5.0) as u8
    }
}
