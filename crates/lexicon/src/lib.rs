//! The eco-relevance lexicon.
//!
//! A fixed taxonomy of terms grouped by kind: product categories, materials,
//! certifications/attributes, negative indicators, literal eco products and
//! generic visual cues. A `Lexicon` is built once and then only read; it is
//! `Send + Sync` and is meant to be shared by reference across any number of
//! concurrent classification calls.

use ecocert_model::{EntryType, LexiconEntry};
use serde::Deserialize;
use thiserror::Error;

/// Errors from loading a custom lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Lexicon parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Group name must not be empty")]
    EmptyGroupName,

    #[error("Duplicate group: {0}")]
    DuplicateGroup(String),

    #[error("Group has no terms: {0}")]
    EmptyGroup(String),
}

const CATEGORIES: &[(&str, &[&str])] = &[
    ("coffee_accessories", &["coffee", "pod", "mug", "cup", "thermos", "tumbler", "grinder"]),
    ("bags_and_accessories", &["bag", "tote", "wallet", "purse", "backpack", "handbag"]),
    (
        "kitchen_and_home",
        &["kitchen", "compost", "bin", "mat", "utensil", "straw", "wrap", "container"],
    ),
    (
        "personal_care",
        &["soap", "toothbrush", "floss", "dental", "shampoo", "conditioner", "lotion"],
    ),
    (
        "clothing_and_apparel",
        &["clothing", "shirt", "pants", "dress", "jacket", "sock", "underwear"],
    ),
    (
        "outdoor_and_garden",
        &["garden", "plant", "seed", "pot", "camping", "outdoor", "furniture"],
    ),
    ("pet_products", &["pet", "dog", "cat", "toy", "treat", "bed", "leash", "collar"]),
    (
        "office_supplies",
        &["office", "paper", "notebook", "pen", "pencil", "stapler", "organizer"],
    ),
];

const MATERIALS: &[(&str, &[&str])] = &[
    (
        "sustainable_materials",
        &[
            "bamboo", "cork", "hemp", "jute", "organic cotton", "linen", "wool", "recycled",
            "upcycled", "repurposed", "compostable", "biodegradable",
        ],
    ),
    (
        "plastic_alternatives",
        &[
            "glass", "metal", "silicone", "wood", "paper", "cardboard", "stainless steel",
            "ceramic", "stone", "plant fiber",
        ],
    ),
];

const FEATURES: &[(&str, &[&str])] = &[
    (
        "certifications",
        &[
            "organic", "fair trade", "vegan", "cruelty-free", "B Corp", "certified",
            "eco-friendly", "sustainable", "green", "ethical",
        ],
    ),
    (
        "product_attributes",
        &[
            "reusable", "zero waste", "plastic-free", "chemical-free", "natural", "handmade",
            "locally made", "solar", "energy-efficient", "waste-reducing",
        ],
    ),
];

const NEGATIVE_INDICATORS: &[(&str, &[&str])] = &[
    (
        "infrastructure",
        &[
            "traffic light", "stoplight", "signal", "street sign", "pole", "tower", "spotlight",
            "road", "highway", "bridge", "tunnel",
        ],
    ),
    (
        "vehicles",
        &[
            "car", "truck", "bus", "minibus", "taxi", "cab", "trolley", "tram", "streetcar",
            "trolleybus", "rickshaw", "unicycle", "vehicle", "automobile", "motor",
        ],
    ),
    (
        "electronics",
        &[
            "television", "TV", "monitor", "screen", "computer", "laptop", "phone", "electronic",
            "device", "gadget", "appliance",
        ],
    ),
    ("industrial", &["factory", "industrial", "machinery", "equipment", "manufacturing"]),
];

const SPECIFIC_PRODUCTS: &[&str] = &[
    "reusable coffee pod", "coffee pod", "vegan leather", "tote bag", "compost bin",
    "silk dental floss", "dental floss", "dishwashing soap", "soap bar", "organic clothing",
    "reusable baking mat", "wallet", "pod", "floss", "soap",
];

const VISUAL_INDICATORS: &[&str] = &[
    "plant", "leaf", "wood", "bamboo", "green", "recycling symbol", "earth", "water", "tree",
    "sunlight", "garden", "nature", "cotton", "glass jar", "canvas bag", "wooden utensil",
    "metal straw", "silicone lid",
];

/// Group name used for the flat specific-product list.
pub const SPECIFIC_PRODUCTS_GROUP: &str = "specific_products";
/// Group name used for the flat visual-indicator list.
pub const VISUAL_INDICATORS_GROUP: &str = "visual_indicators";
/// Material group checked against seller-declared materials.
pub const SUSTAINABLE_MATERIALS_GROUP: &str = "sustainable_materials";
/// Feature group checked against seller-declared certifications.
pub const CERTIFICATIONS_GROUP: &str = "certifications";

/// A named, ordered list of entries of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconGroup {
    name: String,
    entry_type: EntryType,
    entries: Vec<LexiconEntry>,
}

impl LexiconGroup {
    fn new(name: &str, entry_type: EntryType, terms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            entry_type,
            entries: terms
                .iter()
                .map(|term| LexiconEntry::new(term, entry_type, name))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }
}

/// On-disk shape of a custom lexicon.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    groups: Vec<GroupFile>,
}

#[derive(Debug, Deserialize)]
struct GroupFile {
    name: String,
    #[serde(rename = "type")]
    entry_type: EntryType,
    terms: Vec<String>,
}

/// The full taxonomy. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    groups: Vec<LexiconGroup>,
}

impl Lexicon {
    /// The built-in taxonomy.
    pub fn builtin() -> Self {
        let mut groups = Vec::new();

        for (table, entry_type) in [
            (CATEGORIES, EntryType::Category),
            (MATERIALS, EntryType::Material),
            (FEATURES, EntryType::Feature),
            (NEGATIVE_INDICATORS, EntryType::NegativeIndicator),
        ] {
            groups.extend(
                table
                    .iter()
                    .map(|(name, terms)| LexiconGroup::new(name, entry_type, terms)),
            );
        }

        groups.push(LexiconGroup::new(
            SPECIFIC_PRODUCTS_GROUP,
            EntryType::SpecificProduct,
            SPECIFIC_PRODUCTS,
        ));
        groups.push(LexiconGroup::new(
            VISUAL_INDICATORS_GROUP,
            EntryType::VisualIndicator,
            VISUAL_INDICATORS,
        ));

        Self { groups }
    }

    /// Load a custom taxonomy from JSON.
    ///
    /// ```json
    /// { "groups": [ { "name": "pet_products", "type": "category", "terms": ["leash"] } ] }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(json)?;
        let mut groups: Vec<LexiconGroup> = Vec::with_capacity(file.groups.len());

        for group in file.groups {
            let name = group.name.trim();
            if name.is_empty() {
                return Err(LexiconError::EmptyGroupName);
            }
            if groups.iter().any(|g| g.name == name) {
                return Err(LexiconError::DuplicateGroup(name.to_string()));
            }

            let terms: Vec<&str> = group
                .terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            if terms.is_empty() {
                return Err(LexiconError::EmptyGroup(name.to_string()));
            }

            groups.push(LexiconGroup::new(name, group.entry_type, &terms));
        }

        Ok(Self { groups })
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&LexiconGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All groups, in taxonomy order.
    pub fn groups(&self) -> impl Iterator<Item = &LexiconGroup> {
        self.groups.iter()
    }

    /// All groups holding entries of `entry_type`.
    pub fn groups_of(&self, entry_type: EntryType) -> impl Iterator<Item = &LexiconGroup> {
        self.groups.iter().filter(move |g| g.entry_type == entry_type)
    }

    /// Every entry across all groups.
    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
