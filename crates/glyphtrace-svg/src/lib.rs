//! glyphtrace-svg: SVG text post-processing for traced glyphs.
//!
//! Three concerns, each a pure text transform:
//!
//! - [`postprocess`]: canonicalize black fills, repair the known
//!   nested-`<svg>` defect, and validate gradient references.
//! - [`normalize`]: rescale and re-center path geometry into a fixed
//!   canonical canvas so glyphs render at uniform visual weight.
//! - [`colorize`]: splice an emotion palette into the document as a
//!   solid fill, linear gradient, radial blend, or accented outline.
//!
//! Callers decide whether and where to persist the results; nothing in
//! this crate touches the filesystem.

pub mod colorize;
pub mod normalize;
pub mod postprocess;

pub use colorize::{ColorStrategy, LINEAR_GRADIENT_ID, RADIAL_GRADIENT_ID, colorize};
pub use normalize::{Bounds, NormalizeOptions, ViewBox, content_bounds, normalize};
pub use postprocess::{
    CANONICAL_FILL, Processed, canonicalize_fill, postprocess, repair_structure,
    validate_references,
};

/// Errors raised by the SVG transforms.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    /// Structural repair identified a broken document but could not
    /// locate extractable `<defs>` content inside it.
    #[error("malformed SVG: {0}")]
    Malformed(String),

    /// An internal extraction pattern failed to compile.
    #[error("SVG pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
