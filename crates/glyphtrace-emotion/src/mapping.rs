//! Symbol-meaning to emotion mapping.
//!
//! Glyph catalog entries carry meaning keywords ("Protection",
//! "Mystery", "Vitality") rather than emotion words. A curated table
//! maps the common meanings straight to a core family; within the
//! family a tertiary (or secondary) leaf is picked at random so sibling
//! symbols land on related but distinct colors. Meanings the table does
//! not know fall back to substring matching against the whole index,
//! and as a last resort to the Joy family — never to a neutral gray, so
//! every symbol still receives a saturated palette.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::taxonomy::{EmotionLevel, EmotionNode, EmotionTaxonomy};

/// Curated meaning-keyword → core-family table.
///
/// Entries are matched case-insensitively against whole meanings.
const MEANING_TO_CORE: &[(&str, &str)] = &[
    // Positive / growth meanings
    ("growth", "Joy"),
    ("vitality", "Joy"),
    ("life", "Joy"),
    ("spiritual awakening", "Joy"),
    ("illumination", "Joy"),
    ("discovery", "Joy"),
    ("potential", "Joy"),
    // Protective / caring meanings
    ("protection", "Love"),
    ("loyalty", "Love"),
    ("healing", "Love"),
    ("connection", "Love"),
    ("nurturing", "Love"),
    // Intense / untamed meanings
    ("wildness", "Anger"),
    ("strength", "Anger"),
    ("instinct", "Anger"),
    ("power", "Anger"),
    // Mysterious / unknown meanings
    ("mystery", "Surprise"),
    ("transcendence", "Surprise"),
    ("hidden aspects", "Surprise"),
    ("unconscious", "Surprise"),
    // Threatening meanings
    ("danger", "Fear"),
    ("shadow", "Fear"),
    // Reflective / contemplative meanings
    ("reflection", "Sadness"),
    ("depth", "Sadness"),
    ("cycles", "Sadness"),
];

/// Map a list of symbol meanings to an emotion node.
///
/// Resolution order:
/// 1. the curated table, first matching meaning wins; within the mapped
///    family a random tertiary (then secondary) leaf is preferred over
///    the core for more specific color;
/// 2. substring matching of each meaning against the full index;
/// 3. the Joy core family (documented non-neutral default).
#[must_use]
pub fn map_meanings_to_emotion<'a, R: Rng + ?Sized>(
    taxonomy: &'a EmotionTaxonomy,
    meanings: &[String],
    rng: &mut R,
) -> &'a EmotionNode {
    // 1. Curated direct mapping.
    for meaning in meanings {
        let lower = meaning.to_lowercase();
        if let Some((_, core)) = MEANING_TO_CORE.iter().find(|(key, _)| *key == lower)
            && let Some(node) = pick_family_leaf(taxonomy, core, rng)
        {
            return node;
        }
    }

    // 2. Substring fallback against the whole index.
    for meaning in meanings {
        let lower = meaning.to_lowercase();
        for (key, node) in taxonomy.nodes() {
            if key.contains(&lower) || lower.contains(key) {
                return node;
            }
        }
    }

    // 3. Non-neutral default.
    taxonomy.fallback()
}

/// Pick a leaf inside a core family, preferring tertiary, then
/// secondary, then the core node itself.
fn pick_family_leaf<'a, R: Rng + ?Sized>(
    taxonomy: &'a EmotionTaxonomy,
    core: &str,
    rng: &mut R,
) -> Option<&'a EmotionNode> {
    let family = taxonomy.family(core);
    if family.is_empty() {
        return None;
    }

    for level in [EmotionLevel::Tertiary, EmotionLevel::Secondary] {
        let candidates: Vec<&EmotionNode> = family
            .iter()
            .copied()
            .filter(|n| n.level == level)
            .collect();
        if let Some(node) = candidates.choose(rng).copied() {
            return Some(node);
        }
    }
    family.first().copied()
}
