//! glyphtrace-emotion: emotion taxonomy and palette derivation.
//!
//! Maps free text and symbol-meaning keywords onto a fixed three-level
//! emotion taxonomy (core → secondary → tertiary), each node carrying a
//! hex color, and derives the five-color palettes consumed by the SVG
//! colorization strategies.
//!
//! The taxonomy is an explicitly constructed, immutable value — load it
//! once at process start (usually [`EmotionTaxonomy::builtin`]) and
//! pass it by reference. Safe for concurrent read-only access.

pub mod analyze;
pub mod mapping;
pub mod palette;
pub mod taxonomy;

pub use analyze::{analyze_text, dominant_emotion, dominant_with_blend};
pub use mapping::map_meanings_to_emotion;
pub use palette::{ColorError, Palette, Rgb};
pub use taxonomy::{EmotionLevel, EmotionNode, EmotionTaxonomy, TaxonomyError};
