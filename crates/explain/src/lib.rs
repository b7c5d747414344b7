//! Explanation generation for eco classifications.
//!
//! Converts collected evidence into human-readable lines suitable for
//! display next to a product listing: detection summary, recognized
//! elements, seller recommendations and a one-line verdict.

use ecocert_lexicon::SUSTAINABLE_MATERIALS_GROUP;
use ecocert_model::{
    ClassificationResult, DeclaredKind, EntryType, EvidenceSet, LabelPrediction, MatchRecord,
    ProductMetadata,
};

/// Prefix marking lines that report negative evidence.
pub const WARNING_PREFIX: &str = "⚠ ";

/// Turn a group name like `bags_and_accessories` into `Bags And Accessories`.
pub fn humanize_group(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn group_line(label: &str, groups: &[String]) -> String {
    let names: Vec<String> = groups.iter().map(|g| humanize_group(g)).collect();
    format!("{}: {}", label, names.join(", "))
}

/// Ordered summary lines, one per non-empty evidence group.
///
/// Positive groups come first (products, categories, materials, features),
/// then confirmed seller declarations, then negative groups marked with
/// [`WARNING_PREFIX`].
pub fn detection_summary(evidence: &EvidenceSet) -> Vec<String> {
    let mut lines = Vec::new();

    if !evidence.specific_products.is_empty() {
        lines.push(format!("Products: {}", evidence.specific_products.join(", ")));
    }
    if !evidence.categories.is_empty() {
        lines.push(group_line("Categories", &evidence.categories));
    }
    if !evidence.materials.is_empty() {
        lines.push(group_line("Materials", &evidence.materials));
    }
    if !evidence.features.is_empty() {
        lines.push(group_line("Features", &evidence.features));
    }

    for declared in &evidence.declared {
        let kind = match declared.kind {
            DeclaredKind::Material => "Declared material",
            DeclaredKind::Certification => "Declared certification",
        };
        lines.push(format!("{}: {}", kind, declared.value));
    }

    if !evidence.negatives.is_empty() {
        lines.push(format!(
            "{}{}",
            WARNING_PREFIX,
            group_line("Non-eco indicators", &evidence.negatives)
        ));
    }

    lines
}

/// Labels and tokens that produced at least one positive match, deduplicated
/// in first-seen order.
pub fn recognized_elements(evidence: &EvidenceSet) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in evidence.matches.iter().filter(|m| m.is_positive()) {
        if !seen.contains(&record.source_term) {
            seen.push(record.source_term.clone());
        }
    }
    seen
}

/// Advice for the seller based on what was and was not found.
pub fn recommendations(
    labels: &[LabelPrediction],
    evidence: &EvidenceSet,
    metadata: Option<&ProductMetadata>,
) -> Vec<String> {
    let mut advice = Vec::new();

    let certification_count = metadata.map_or(0, |m| m.certifications.len());
    if certification_count < 2 {
        advice.push("Consider adding eco-certifications to improve product credibility".to_string());
    }

    let has_sustainable_material = evidence
        .materials
        .iter()
        .any(|g| g == SUSTAINABLE_MATERIALS_GROUP)
        || evidence
            .declared
            .iter()
            .any(|d| d.kind == DeclaredKind::Material);
    if !has_sustainable_material {
        advice.push("Consider using more sustainable materials in your product".to_string());
    }

    let mentions_packaging = labels
        .iter()
        .any(|l| l.label.to_lowercase().contains("packaging"))
        || metadata.is_some_and(|m| {
            [m.name.as_deref(), m.description.as_deref()]
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase().contains("packaging"))
        });
    if !mentions_packaging {
        advice.push("Add information about eco-friendly packaging".to_string());
    }

    if advice.is_empty() {
        advice.push("Your product appears to meet eco-friendly standards".to_string());
    }

    advice
}

/// Describe a single match, e.g. `'coffee mug' ~ category 'mug' (Coffee Accessories): +0.90`.
pub fn describe_match(record: &MatchRecord) -> String {
    let entry = &record.matched_entry;
    let kind = match entry.entry_type {
        EntryType::Category => "category",
        EntryType::Material => "material",
        EntryType::Feature => "feature",
        EntryType::NegativeIndicator => "negative indicator",
        EntryType::SpecificProduct => "product",
        EntryType::VisualIndicator => "visual cue",
    };
    format!(
        "'{}' ~ {} '{}' ({}): {:+.2}",
        record.source_term,
        kind,
        entry.text,
        humanize_group(&entry.group_name),
        record.weighted_score
    )
}

/// Generate a one-line verdict for a classification.
pub fn summarize_result(result: &ClassificationResult) -> String {
    let head = format!(
        "{} ({:.1}/5, {} confidence)",
        result.rating.label(),
        result.display_score(),
        result.confidence.label()
    );

    if result.detection_summary.is_empty() {
        return format!("{}: no eco-relevant elements recognized", head);
    }

    format!("{}: {}", head, result.detection_summary.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecocert_model::{ConfidenceLevel, DeclaredAttribute, EcoRating, LexiconEntry};
    use pretty_assertions::assert_eq;

    fn record(term: &str, text: &str, entry_type: EntryType, group: &str, score: f64) -> MatchRecord {
        MatchRecord {
            source_term: term.to_string(),
            matched_entry: LexiconEntry::new(text, entry_type, group),
            weighted_score: score,
            source_probability: 0.9,
            from_token: false,
        }
    }

    #[test]
    fn test_humanize_group() {
        assert_eq!(humanize_group("bags_and_accessories"), "Bags And Accessories");
        assert_eq!(humanize_group("vehicles"), "Vehicles");
        assert_eq!(humanize_group(""), "");
    }

    #[test]
    fn test_detection_summary_order() {
        let evidence = EvidenceSet {
            categories: vec!["coffee_accessories".into()],
            materials: vec!["sustainable_materials".into()],
            specific_products: vec!["coffee pod".into()],
            negatives: vec!["vehicles".into(), "electronics".into()],
            declared: vec![DeclaredAttribute {
                kind: DeclaredKind::Certification,
                value: "Fair Trade".into(),
                matched: "fair trade".into(),
            }],
            ..Default::default()
        };

        assert_eq!(
            detection_summary(&evidence),
            vec![
                "Products: coffee pod".to_string(),
                "Categories: Coffee Accessories".to_string(),
                "Materials: Sustainable Materials".to_string(),
                "Declared certification: Fair Trade".to_string(),
                "⚠ Non-eco indicators: Vehicles, Electronics".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_evidence_has_no_summary() {
        assert!(detection_summary(&EvidenceSet::default()).is_empty());
        assert!(recognized_elements(&EvidenceSet::default()).is_empty());
    }

    #[test]
    fn test_recognized_elements_skip_negatives() {
        let evidence = EvidenceSet {
            matches: vec![
                record("coffee mug", "mug", EntryType::Category, "coffee_accessories", 0.9),
                record("coffee", "coffee", EntryType::Category, "coffee_accessories", 0.63),
                record("coffee mug", "coffee", EntryType::Category, "coffee_accessories", 0.9),
                record("car", "car", EntryType::NegativeIndicator, "vehicles", -0.6),
            ],
            ..Default::default()
        };
        assert_eq!(recognized_elements(&evidence), vec!["coffee mug", "coffee"]);
    }

    #[test]
    fn test_recommendations_when_nothing_declared() {
        let advice = recommendations(&[], &EvidenceSet::default(), None);
        assert_eq!(advice.len(), 3);
        assert!(advice[0].contains("certifications"));
        assert!(advice[1].contains("sustainable materials"));
        assert!(advice[2].contains("packaging"));
    }

    #[test]
    fn test_recommendations_when_complete() {
        let evidence = EvidenceSet {
            materials: vec!["sustainable_materials".into()],
            ..Default::default()
        };
        let metadata = ProductMetadata::default()
            .with_certifications(&["organic", "fair trade"])
            .with_description("Ships in recycled packaging");

        let advice = recommendations(&[], &evidence, Some(&metadata));
        assert_eq!(advice, vec!["Your product appears to meet eco-friendly standards"]);
    }

    #[test]
    fn test_describe_match() {
        let line = describe_match(&record("coffee mug", "mug", EntryType::Category, "coffee_accessories", 0.9));
        assert_eq!(line, "'coffee mug' ~ category 'mug' (Coffee Accessories): +0.90");
    }

    #[test]
    fn test_summarize_result() {
        let result = ClassificationResult {
            raw_score: 0.45,
            scaled_score: 4.75,
            confidence: ConfidenceLevel::High,
            rating: EcoRating::Confirmed,
            eco_friendly: true,
            detection_summary: vec!["Products: tote bag".into()],
            matched_features: vec!["tote bag".into()],
            recommendations: vec![],
            matches: vec![],
        };
        assert_eq!(
            summarize_result(&result),
            "Confirmed eco-friendly product (4.8/5, High confidence): Products: tote bag"
        );
    }
}
