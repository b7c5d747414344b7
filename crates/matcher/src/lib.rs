//! Term matching against the eco lexicon.
//!
//! Pure functions only:
//! - Text normalization and label tokenization
//! - Word-boundary containment
//! - The per-entry match rule and its score
//!
//! Match rule for one (term, entry) pair, strongest kind first:
//! 1. `Exact`: term equals the entry text.
//! 2. `TermContainsEntry`: the entry text occurs inside the term. For negative
//!    indicators the occurrence must sit on word boundaries.
//! 3. `EntryContainsTerm`: the term occurs inside an entry longer than
//!    `REVERSE_MATCH_MIN_LEN` characters. Never used for negative indicators
//!    or features.
//!
//! At most one kind is reported per entry; a term may still match many entries.

use ecocert_lexicon::{Lexicon, LexiconGroup};
use ecocert_model::{EntryType, LexiconEntry};
use serde::{Deserialize, Serialize};

/// Entries must be longer than this to match a term they contain.
pub const REVERSE_MATCH_MIN_LEN: usize = 5;

/// How a term matched an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    TermContainsEntry,
    EntryContainsTerm,
}

impl MatchKind {
    /// Fraction of the entry's base score awarded for this kind of match.
    pub fn factor(&self, entry_type: EntryType) -> f64 {
        match (self, entry_type) {
            (Self::Exact, _) => 1.0,

            (Self::TermContainsEntry, EntryType::Category) => 1.0,
            (Self::TermContainsEntry, EntryType::Material | EntryType::Feature) => 0.9,
            (Self::TermContainsEntry, EntryType::SpecificProduct) => 0.8,
            (Self::TermContainsEntry, EntryType::VisualIndicator) => 0.7,
            (Self::TermContainsEntry, EntryType::NegativeIndicator) => 0.7,

            (Self::EntryContainsTerm, EntryType::Category) => 0.8,
            (Self::EntryContainsTerm, _) => 0.7,
        }
    }
}

/// A match of a term against one entry, before probability weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermMatch<'a> {
    pub entry: &'a LexiconEntry,
    pub kind: MatchKind,
    pub score: f64,
}

/// Lower-case and trim a term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Split a label into tokens on whitespace, comma, underscore, hyphen and
/// opening parenthesis. Empty pieces are dropped; short ones are kept.
pub fn tokenize(label: &str) -> Vec<&str> {
    label
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '_' | '-' | '('))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether `needle` occurs in `haystack` bounded by the string edges or by
/// non-alphanumeric characters on both sides.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

fn allows_reverse_match(entry_type: EntryType) -> bool {
    !matches!(entry_type, EntryType::NegativeIndicator | EntryType::Feature)
}

/// Decide whether an already-normalized term matches an entry.
pub fn match_kind(term: &str, entry: &LexiconEntry) -> Option<MatchKind> {
    if term.is_empty() || entry.text.is_empty() {
        return None;
    }

    if term == entry.text {
        return Some(MatchKind::Exact);
    }

    if entry.entry_type.is_negative() {
        return contains_word(term, &entry.text).then_some(MatchKind::TermContainsEntry);
    }

    if term.contains(entry.text.as_str()) {
        return Some(MatchKind::TermContainsEntry);
    }

    if allows_reverse_match(entry.entry_type)
        && entry.text.chars().count() > REVERSE_MATCH_MIN_LEN
        && entry.text.contains(term)
    {
        return Some(MatchKind::EntryContainsTerm);
    }

    None
}

fn score_entry<'a>(term: &str, entry: &'a LexiconEntry) -> Option<TermMatch<'a>> {
    match_kind(term, entry).map(|kind| TermMatch {
        entry,
        kind,
        score: entry.base_score * kind.factor(entry.entry_type),
    })
}

/// Match a term against every entry in the lexicon.
pub fn match_term<'a>(term: &str, lexicon: &'a Lexicon) -> Vec<TermMatch<'a>> {
    let term = normalize_term(term);
    let matches: Vec<_> = lexicon
        .entries()
        .filter_map(|entry| score_entry(&term, entry))
        .collect();

    tracing::trace!(term = %term, matches = matches.len(), "Matched term");
    matches
}

/// Match a term against a single group.
pub fn match_group<'a>(term: &str, group: &'a LexiconGroup) -> Vec<TermMatch<'a>> {
    let term = normalize_term(term);
    group
        .entries()
        .iter()
        .filter_map(|entry| score_entry(&term, entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, entry_type: EntryType) -> LexiconEntry {
        LexiconEntry::new(text, entry_type, "test_group")
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("cab, hack, taxi_cab (vehicle)"),
            vec!["cab", "hack", "taxi", "cab", "vehicle)"]
        );
        assert_eq!(tokenize("eco-friendly  tote"), vec!["eco", "friendly", "tote"]);
        assert!(tokenize("  ").is_empty());
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("red car", "car"));
        assert!(contains_word("car seat", "car"));
        assert!(contains_word("car", "car"));
        assert!(contains_word("sports car, racer", "car"));
        assert!(!contains_word("carpet", "car"));
        assert!(!contains_word("scarf", "car"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(match_kind("mug", &entry("mug", EntryType::Category)), Some(MatchKind::Exact));
    }

    #[test]
    fn test_term_contains_entry() {
        assert_eq!(
            match_kind("coffee mug", &entry("mug", EntryType::Category)),
            Some(MatchKind::TermContainsEntry)
        );
    }

    #[test]
    fn test_reverse_match_is_length_gated() {
        // "bed" is too short to swallow anything
        assert_eq!(match_kind("be", &entry("bed", EntryType::Category)), None);
        // Long entries may contain a short observed term
        assert_eq!(
            match_kind("bamboo", &entry("bamboo toothbrush", EntryType::Material)),
            Some(MatchKind::EntryContainsTerm)
        );
        // Exactly five characters does not qualify
        assert_eq!(match_kind("ston", &entry("stone", EntryType::Material)), None);
    }

    #[test]
    fn test_features_never_reverse_match() {
        assert_eq!(match_kind("plastic", &entry("plastic-free", EntryType::Feature)), None);
        assert_eq!(
            match_kind("plastic-free bottle", &entry("plastic-free", EntryType::Feature)),
            Some(MatchKind::TermContainsEntry)
        );
    }

    #[test]
    fn test_negative_requires_word_boundary() {
        let car = entry("car", EntryType::NegativeIndicator);
        assert_eq!(match_kind("car", &car), Some(MatchKind::Exact));
        assert_eq!(match_kind("sports car", &car), Some(MatchKind::TermContainsEntry));
        assert_eq!(match_kind("carton", &car), None);
        assert_eq!(match_kind("cardigan", &car), None);

        // No reverse containment for negatives
        let monitor = entry("monitor", EntryType::NegativeIndicator);
        assert_eq!(match_kind("monit", &monitor), None);
    }

    #[test]
    fn test_empty_term_matches_nothing() {
        let lexicon = Lexicon::builtin();
        assert!(match_term("", &lexicon).is_empty());
        assert!(match_term("   ", &lexicon).is_empty());
    }

    #[test]
    fn test_exact_scores() {
        let lexicon = Lexicon::builtin();
        let score_of = |term: &str, entry_type: EntryType| {
            match_term(term, &lexicon)
                .into_iter()
                .find(|m| m.entry.entry_type == entry_type && m.kind == MatchKind::Exact)
                .map(|m| m.score)
        };

        assert_eq!(score_of("mug", EntryType::Category), Some(1.0));
        assert_eq!(score_of("bamboo", EntryType::Material), Some(1.2));
        assert_eq!(score_of("vegan", EntryType::Feature), Some(1.5));
        assert_eq!(score_of("tote bag", EntryType::SpecificProduct), Some(2.0));
        assert_eq!(score_of("leaf", EntryType::VisualIndicator), Some(1.0));
        assert_eq!(score_of("traffic light", EntryType::NegativeIndicator), Some(-1.5));
    }

    #[test]
    fn test_exact_dominates_substring() {
        let lexicon = Lexicon::builtin();
        for entry in lexicon.entries() {
            let exact = score_entry(&entry.text, entry).unwrap();
            let padded = format!("large {} item", entry.text);
            if let Some(partial) = score_entry(&padded, entry) {
                assert!(
                    exact.score.abs() >= partial.score.abs(),
                    "{}: exact {} < partial {}",
                    entry.text,
                    exact.score,
                    partial.score
                );
            }
        }
    }

    #[test]
    fn test_term_matches_multiple_groups() {
        let lexicon = Lexicon::builtin();
        // "paper" is both an office supply and a plastic alternative
        let groups: Vec<_> = match_term("Paper", &lexicon)
            .into_iter()
            .map(|m| m.entry.group_name.as_str())
            .collect();
        assert!(groups.contains(&"office_supplies"));
        assert!(groups.contains(&"plastic_alternatives"));
    }

    #[test]
    fn test_match_group() {
        let lexicon = Lexicon::builtin();
        let certs = lexicon.group("certifications").unwrap();
        let matches = match_group("Fair Trade Certified", certs);
        let texts: Vec<_> = matches.iter().map(|m| m.entry.text.as_str()).collect();
        assert_eq!(texts, vec!["fair trade", "certified"]);
        assert!(match_group("polyester", certs).is_empty());
    }
}
