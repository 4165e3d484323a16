//! glyphtrace-graph: relationship-graph export for glyph catalogs.
//!
//! Produces the JSON document consumed by the external force-directed
//! graph renderer: `nodes` carrying symbol metadata (id, name,
//! category, color, normalized icon path, connection-derived size) and
//! `links` carrying weighted, typed relationships. The renderer itself
//! is out of scope — only its input shape is produced here, and that
//! shape is the contract.

use serde::{Deserialize, Serialize};

/// Most links kept in one document; strongest-first beyond this the
/// visualization becomes unreadable.
const MAX_LINKS: usize = 200;

/// Base node size before connection scaling.
const NODE_BASE_SIZE: u32 = 10;

/// Size added per connection, capped at [`NODE_SIZE_CAP`].
const NODE_SIZE_STEP: u32 = 2;

/// Upper bound on rendered node size.
const NODE_SIZE_CAP: u32 = 40;

/// Errors raised while assembling a graph document.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A link references a symbol id that was never added.
    #[error("link references unknown symbol {0:?}")]
    UnknownSymbol(String),

    /// A link strength is outside `[0, 1]`.
    #[error("link strength {0} outside [0, 1]")]
    BadStrength(f64),
}

/// A symbol entry before graph assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Stable identifier (also the node id).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Catalog category, e.g. "animal" or "element".
    pub category: String,
    /// Emotion-derived hex color.
    pub color: String,
    /// Path to the normalized SVG icon.
    pub icon: String,
}

/// A graph node as the renderer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node id (matches link endpoints).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Catalog category.
    pub category: String,
    /// Emotion-derived hex color.
    pub color: String,
    /// Path to the normalized SVG icon.
    pub icon: String,
    /// Render size derived from the node's connection count.
    pub size: u32,
}

/// A weighted, typed relationship between two symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relationship strength in `[0, 1]`.
    pub strength: f64,
    /// Relationship type, e.g. "elemental_opposition".
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description of the connection.
    pub description: String,
}

/// Document-level statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// Number of nodes.
    pub total_symbols: usize,
    /// Number of links after dedup and capping.
    pub total_relationships: usize,
    /// Mean link strength (0.0 for an empty link set).
    pub avg_relationship_strength: f64,
}

/// The complete export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// All symbol nodes.
    pub nodes: Vec<GraphNode>,
    /// Deduplicated links, strongest first.
    pub links: Vec<GraphLink>,
    /// Document statistics.
    pub metadata: GraphMetadata,
}

/// Accumulates symbols and relationships, then assembles the document.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    symbols: Vec<Symbol>,
    links: Vec<GraphLink>,
}

impl GraphBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol node.
    pub fn add_symbol(&mut self, symbol: Symbol) -> &mut Self {
        self.symbols.push(symbol);
        self
    }

    /// Add a relationship between two previously added symbols.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownSymbol`] for an endpoint that was
    /// never added and [`GraphError::BadStrength`] for a strength
    /// outside `[0, 1]`.
    pub fn add_link(
        &mut self,
        source: &str,
        target: &str,
        strength: f64,
        kind: &str,
        description: &str,
    ) -> Result<&mut Self, GraphError> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(GraphError::BadStrength(strength));
        }
        for endpoint in [source, target] {
            if !self.symbols.iter().any(|s| s.id == endpoint) {
                return Err(GraphError::UnknownSymbol(endpoint.to_string()));
            }
        }
        self.links.push(GraphLink {
            source: source.to_string(),
            target: target.to_string(),
            strength,
            kind: kind.to_string(),
            description: description.to_string(),
        });
        Ok(self)
    }

    /// Assemble the document: dedupe symmetric pairs (first added
    /// wins), sort strongest-first, cap the link count, and derive
    /// node sizes from connection counts.
    #[must_use]
    pub fn build(&self) -> GraphDocument {
        // Dedupe symmetric pairs, keeping the first-added link.
        let mut kept: Vec<GraphLink> = Vec::new();
        for link in &self.links {
            let duplicate = kept.iter().any(|k| {
                (k.source == link.source && k.target == link.target)
                    || (k.source == link.target && k.target == link.source)
            });
            if !duplicate {
                kept.push(link.clone());
            }
        }

        kept.sort_by(|a, b| {
            b.strength
                .partial_cmp(&a.strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        kept.truncate(MAX_LINKS);

        let nodes: Vec<GraphNode> = self
            .symbols
            .iter()
            .map(|s| {
                let connections = kept
                    .iter()
                    .filter(|l| l.source == s.id || l.target == s.id)
                    .count();
                #[allow(clippy::cast_possible_truncation)]
                let size = (NODE_BASE_SIZE + NODE_SIZE_STEP * connections as u32)
                    .min(NODE_SIZE_CAP);
                GraphNode {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    category: s.category.clone(),
                    color: s.color.clone(),
                    icon: s.icon.clone(),
                    size,
                }
            })
            .collect();

        let avg = if kept.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                kept.iter().map(|l| l.strength).sum::<f64>() / kept.len() as f64
            }
        };

        GraphDocument {
            metadata: GraphMetadata {
                total_symbols: nodes.len(),
                total_relationships: kept.len(),
                avg_relationship_strength: avg,
            },
            nodes,
            links: kept,
        }
    }
}
