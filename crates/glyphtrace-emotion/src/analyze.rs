//! Free-text emotion analysis.
//!
//! Tokenizes input on whitespace, strips non-alphabetic characters per
//! token, and looks each token up in the taxonomy index. Matches come
//! back in appearance order; the dominant-emotion rule then prefers the
//! most specific level.

use crate::taxonomy::{EmotionLevel, EmotionNode, EmotionTaxonomy};

/// Find every taxonomy match in a piece of free text.
///
/// Tokens are split on whitespace and reduced to their alphabetic
/// characters before lookup, so "terrified," and "terrified" match the
/// same node. Duplicates are kept and order follows the input.
#[must_use]
pub fn analyze_text<'a>(taxonomy: &'a EmotionTaxonomy, text: &str) -> Vec<&'a EmotionNode> {
    text.split_whitespace()
        .filter_map(|token| {
            let word: String = token.chars().filter(|c| c.is_alphabetic()).collect();
            if word.is_empty() {
                None
            } else {
                taxonomy.find(&word)
            }
        })
        .collect()
}

/// Pick the dominant emotion from a list of matches.
///
/// The most specific level wins: any tertiary match beats any secondary
/// match, which beats any core match. Within a level, the first
/// occurrence in the input wins.
#[must_use]
pub fn dominant_emotion<'a>(matches: &[&'a EmotionNode]) -> Option<&'a EmotionNode> {
    for level in [
        EmotionLevel::Tertiary,
        EmotionLevel::Secondary,
        EmotionLevel::Core,
    ] {
        if let Some(node) = matches.iter().find(|n| n.level == level) {
            return Some(node);
        }
    }
    None
}

/// Analyze text and resolve the dominant match in one call.
///
/// Returns the dominant node plus the second distinct match (used as
/// the palette's blend partner), when one exists.
#[must_use]
pub fn dominant_with_blend<'a>(
    taxonomy: &'a EmotionTaxonomy,
    text: &str,
) -> Option<(&'a EmotionNode, Option<&'a EmotionNode>)> {
    let matches = analyze_text(taxonomy, text);
    let dominant = dominant_emotion(&matches)?;
    let blend = matches.iter().find(|n| ***n != *dominant).copied();
    Some((dominant, blend))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn taxonomy() -> EmotionTaxonomy {
        EmotionTaxonomy::builtin().unwrap()
    }

    // --- analyze_text ---

    #[test]
    fn finds_matches_in_appearance_order() {
        let t = taxonomy();
        let matches = analyze_text(&t, "joy then fear then joy again");
        let names: Vec<&str> = matches.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Joy", "Fear", "Joy"]);
    }

    #[test]
    fn strips_punctuation_before_lookup() {
        let t = taxonomy();
        let matches = analyze_text(&t, "I felt terrified, truly terrified!");
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|n| n.name() == "Terrified"));
    }

    #[test]
    fn no_matches_for_neutral_text() {
        let t = taxonomy();
        assert!(analyze_text(&t, "the quick brown fox").is_empty());
    }

    #[test]
    fn numeric_tokens_are_ignored() {
        let t = taxonomy();
        assert!(analyze_text(&t, "42 100 7").is_empty());
    }

    // --- dominant_emotion ---

    #[test]
    fn tertiary_beats_secondary_beats_core() {
        let t = taxonomy();
        // "fear" is core, "terror" secondary, "terrified" tertiary.
        let matches = analyze_text(&t, "fear terror terrified");
        let dominant = dominant_emotion(&matches).unwrap();
        assert_eq!(dominant.name(), "Terrified");

        // Order must not matter.
        let reversed = analyze_text(&t, "terrified terror fear");
        let dominant = dominant_emotion(&reversed).unwrap();
        assert_eq!(dominant.name(), "Terrified");
    }

    #[test]
    fn first_occurrence_breaks_ties_within_a_level() {
        let t = taxonomy();
        let matches = analyze_text(&t, "happiness sorrow");
        let dominant = dominant_emotion(&matches).unwrap();
        assert_eq!(dominant.name(), "Happiness");
    }

    #[test]
    fn empty_matches_yield_none() {
        assert!(dominant_emotion(&[]).is_none());
    }

    // --- dominant_with_blend ---

    #[test]
    fn blend_partner_is_second_distinct_match() {
        let t = taxonomy();
        let (dominant, blend) = dominant_with_blend(&t, "terrified and overwhelmed").unwrap();
        assert_eq!(dominant.name(), "Terrified");
        assert_eq!(blend.unwrap().name(), "Overwhelmed");
    }

    #[test]
    fn single_match_has_no_blend() {
        let t = taxonomy();
        let (dominant, blend) = dominant_with_blend(&t, "pure joy").unwrap();
        assert_eq!(dominant.name(), "Joy");
        assert!(blend.is_none());
    }

    #[test]
    fn spec_scenario_maps_into_fear_family() {
        let t = taxonomy();
        let (dominant, _) = dominant_with_blend(&t, "I felt terrified and overwhelmed").unwrap();
        assert_eq!(dominant.core, "Fear");
        assert_eq!(dominant.level, crate::taxonomy::EmotionLevel::Tertiary);
        assert_eq!(dominant.hex.len(), 7);
        assert!(dominant.hex[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
