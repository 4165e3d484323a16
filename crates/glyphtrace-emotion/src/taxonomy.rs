//! The three-level emotion taxonomy and its flat lookup index.
//!
//! The taxonomy is a fixed tree (core → secondary → tertiary), each node
//! carrying a name and a hex color. It is loaded once from a static JSON
//! resource and flattened into a case-insensitive name→node map so that
//! lookups cost the same regardless of taxonomy depth.
//!
//! [`EmotionTaxonomy`] is an explicitly constructed, immutable value:
//! callers load it at process start and pass it by reference into the
//! analysis and mapping functions. There is no global singleton.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The raw JSON resource bundled with the crate.
const BUILTIN_TAXONOMY: &str = include_str!("../data/emotions_colors.json");

/// Errors raised while loading or validating a taxonomy resource.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// The resource is not valid JSON of the expected shape.
    #[error("failed to parse emotion taxonomy: {0}")]
    Parse(#[from] serde_json::Error),

    /// The resource parsed but contains no core emotions.
    #[error("emotion taxonomy contains no core emotions")]
    Empty,
}

/// A tertiary (leaf) emotion entry in the JSON resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TertiaryEntry {
    /// Emotion name, e.g. "Terrified".
    pub name: String,
    /// Hex color, e.g. "#3D0C66".
    pub hex: String,
}

/// A secondary emotion entry in the JSON resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryEntry {
    /// Emotion name, e.g. "Terror".
    pub name: String,
    /// Hex color.
    pub hex: String,
    /// Leaf emotions under this secondary.
    #[serde(default)]
    pub tertiary: Vec<TertiaryEntry>,
}

/// A core emotion family entry in the JSON resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreEntry {
    /// Family name, e.g. "Fear".
    pub core: String,
    /// Family color.
    pub hex: String,
    /// Secondary emotions in this family.
    #[serde(default)]
    pub secondary: Vec<SecondaryEntry>,
}

/// Depth of a node within the taxonomy tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLevel {
    /// Top-level family (e.g. Fear).
    Core,
    /// Second level (e.g. Terror).
    Secondary,
    /// Leaf level (e.g. Terrified).
    Tertiary,
}

/// A flattened taxonomy node: one name at one level, with its full
/// ancestry and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionNode {
    /// Depth of this node.
    pub level: EmotionLevel,
    /// Core family name this node belongs to.
    pub core: String,
    /// Secondary name, when the node is secondary or tertiary.
    pub secondary: Option<String>,
    /// Tertiary name, when the node is a leaf.
    pub tertiary: Option<String>,
    /// Hex color declared for this node.
    pub hex: String,
    /// Names from the core down to this node, in order.
    pub path: Vec<String>,
}

impl EmotionNode {
    /// The node's own name (the last element of its path).
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or(self.core.as_str(), String::as_str)
    }
}

/// The loaded, immutable emotion taxonomy.
///
/// Holds the raw tree (for family traversal) and a flat lowercase
/// name→node index (for O(1) lookup at any level).
#[derive(Debug, Clone)]
pub struct EmotionTaxonomy {
    cores: Vec<CoreEntry>,
    index: HashMap<String, EmotionNode>,
    fallback_node: EmotionNode,
}

impl EmotionTaxonomy {
    /// Load the taxonomy bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError`] if the bundled resource is malformed
    /// (which would indicate a packaging defect).
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_json(BUILTIN_TAXONOMY)
    }

    /// Parse a taxonomy from a JSON string.
    ///
    /// The expected shape is a list of
    /// `{core, hex, secondary: [{name, hex, tertiary: [{name, hex}]}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::Parse`] on malformed JSON and
    /// [`TaxonomyError::Empty`] when the list has no entries.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let cores: Vec<CoreEntry> = serde_json::from_str(json)?;
        let Some(first) = cores.first() else {
            return Err(TaxonomyError::Empty);
        };
        let fallback_node = EmotionNode {
            level: EmotionLevel::Core,
            core: first.core.clone(),
            secondary: None,
            tertiary: None,
            hex: first.hex.clone(),
            path: vec![first.core.clone()],
        };
        let index = build_index(&cores);
        Ok(Self {
            cores,
            index,
            fallback_node,
        })
    }

    /// Look up an emotion by name, case-insensitively, at any level.
    #[must_use]
    pub fn find(&self, word: &str) -> Option<&EmotionNode> {
        self.index.get(&word.to_lowercase())
    }

    /// All nodes (at every level) belonging to the named core family.
    ///
    /// The family name is matched case-insensitively. Nodes are returned
    /// in taxonomy order: the core itself, then each secondary followed
    /// by its tertiaries.
    #[must_use]
    pub fn family(&self, core: &str) -> Vec<&EmotionNode> {
        let Some(entry) = self
            .cores
            .iter()
            .find(|c| c.core.eq_ignore_ascii_case(core))
        else {
            return Vec::new();
        };

        let mut names = vec![entry.core.to_lowercase()];
        for sec in &entry.secondary {
            names.push(sec.name.to_lowercase());
            for ter in &sec.tertiary {
                names.push(ter.name.to_lowercase());
            }
        }
        names.iter().filter_map(|n| self.index.get(n)).collect()
    }

    /// Iterate over every node in the flat index.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &EmotionNode)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The core family entries in resource order.
    #[must_use]
    pub fn cores(&self) -> &[CoreEntry] {
        &self.cores
    }

    /// The node used when no lookup or mapping matches: the Joy core
    /// when the resource declares one, otherwise the first core family.
    /// Always available — construction rejects empty resources.
    #[must_use]
    pub fn fallback(&self) -> &EmotionNode {
        self.find("joy").unwrap_or(&self.fallback_node)
    }

    /// Number of nodes in the flat index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty. Always `false` for a constructed
    /// taxonomy (construction rejects empty resources).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Flatten the taxonomy tree into a lowercase name→node map.
///
/// A name appearing at more than one position keeps its first
/// occurrence, matching resource order.
fn build_index(cores: &[CoreEntry]) -> HashMap<String, EmotionNode> {
    let mut index = HashMap::new();

    for core in cores {
        insert_once(
            &mut index,
            &core.core,
            EmotionNode {
                level: EmotionLevel::Core,
                core: core.core.clone(),
                secondary: None,
                tertiary: None,
                hex: core.hex.clone(),
                path: vec![core.core.clone()],
            },
        );

        for sec in &core.secondary {
            insert_once(
                &mut index,
                &sec.name,
                EmotionNode {
                    level: EmotionLevel::Secondary,
                    core: core.core.clone(),
                    secondary: Some(sec.name.clone()),
                    tertiary: None,
                    hex: sec.hex.clone(),
                    path: vec![core.core.clone(), sec.name.clone()],
                },
            );

            for ter in &sec.tertiary {
                insert_once(
                    &mut index,
                    &ter.name,
                    EmotionNode {
                        level: EmotionLevel::Tertiary,
                        core: core.core.clone(),
                        secondary: Some(sec.name.clone()),
                        tertiary: Some(ter.name.clone()),
                        hex: ter.hex.clone(),
                        path: vec![core.core.clone(), sec.name.clone(), ter.name.clone()],
                    },
                );
            }
        }
    }

    index
}

fn insert_once(index: &mut HashMap<String, EmotionNode>, name: &str, node: EmotionNode) {
    index.entry(name.to_lowercase()).or_insert(node);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_taxonomy_loads() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        assert!(!taxonomy.is_empty());
        assert_eq!(taxonomy.cores().len(), 6);
    }

    #[test]
    fn empty_resource_is_rejected() {
        let result = EmotionTaxonomy::from_json("[]");
        assert!(matches!(result, Err(TaxonomyError::Empty)));
    }

    #[test]
    fn malformed_resource_is_rejected() {
        let result = EmotionTaxonomy::from_json("{not json");
        assert!(matches!(result, Err(TaxonomyError::Parse(_))));
    }

    #[test]
    fn find_is_case_insensitive() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        let upper = taxonomy.find("JOY").unwrap();
        let lower = taxonomy.find("joy").unwrap();
        let mixed = taxonomy.find("Joy").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower, mixed);
        assert_eq!(upper.level, EmotionLevel::Core);
    }

    #[test]
    fn find_reaches_all_levels() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();

        let core = taxonomy.find("fear").unwrap();
        assert_eq!(core.level, EmotionLevel::Core);
        assert_eq!(core.path, vec!["Fear"]);

        let secondary = taxonomy.find("terror").unwrap();
        assert_eq!(secondary.level, EmotionLevel::Secondary);
        assert_eq!(secondary.core, "Fear");
        assert_eq!(secondary.path, vec!["Fear", "Terror"]);

        let tertiary = taxonomy.find("terrified").unwrap();
        assert_eq!(tertiary.level, EmotionLevel::Tertiary);
        assert_eq!(tertiary.core, "Fear");
        assert_eq!(tertiary.path, vec!["Fear", "Terror", "Terrified"]);
    }

    #[test]
    fn find_unknown_word_returns_none() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        assert!(taxonomy.find("sandwich").is_none());
    }

    #[test]
    fn family_contains_all_levels_of_one_core() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        let family = taxonomy.family("Fear");
        assert!(!family.is_empty());
        assert!(family.iter().all(|n| n.core == "Fear"));
        assert!(family.iter().any(|n| n.level == EmotionLevel::Core));
        assert!(family.iter().any(|n| n.level == EmotionLevel::Secondary));
        assert!(family.iter().any(|n| n.level == EmotionLevel::Tertiary));
    }

    #[test]
    fn family_of_unknown_core_is_empty() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        assert!(taxonomy.family("Boredom").is_empty());
    }

    #[test]
    fn node_name_is_last_path_element() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        assert_eq!(taxonomy.find("terrified").unwrap().name(), "Terrified");
        assert_eq!(taxonomy.find("fear").unwrap().name(), "Fear");
    }

    #[test]
    fn every_indexed_hex_is_six_digit() {
        let taxonomy = EmotionTaxonomy::builtin().unwrap();
        for (_, node) in taxonomy.nodes() {
            assert!(
                node.hex.len() == 7 && node.hex.starts_with('#'),
                "bad hex for {}: {}",
                node.name(),
                node.hex,
            );
            assert!(node.hex[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
