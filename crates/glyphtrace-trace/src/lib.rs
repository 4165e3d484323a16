//! glyphtrace-trace: vector tracing backends.
//!
//! Defines the [`VectorTracer`] capability trait — mask in, raw SVG
//! text out — and its two implementations: [`Potrace`], which shells
//! out to the external `potrace` binary, and [`CannedTracer`], which
//! returns fixed SVG for tests and offline development.
//!
//! This is the pipeline's only external-process boundary. Everything
//! downstream treats the returned SVG as opaque text, so alternative
//! backends can be substituted without touching callers.

pub mod canned;
pub mod potrace;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use glyphtrace_pipeline::BinaryMask;

pub use canned::CannedTracer;
pub use potrace::Potrace;

/// Errors raised by tracing backends.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The external tracer binary is not installed or not executable.
    ///
    /// Environment-level: callers running batches should abort rather
    /// than retry per item, since every item would fail the same way.
    #[error("vector tracer unavailable: {0}")]
    Unavailable(String),

    /// The tracer ran but exited non-zero or produced an SVG with no
    /// `<path>` elements (a degenerate or blank mask).
    #[error("vector trace failed: {0}")]
    Failed(String),

    /// The tracer exceeded its time budget and was killed.
    #[error("vector trace timed out after {0:?}")]
    Timeout(Duration),

    /// Staging the mask bitmap for the tracer failed.
    #[error("failed to stage mask bitmap: {0}")]
    Stage(#[from] image::ImageError),

    /// Filesystem or process plumbing failed.
    #[error("tracer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Potrace turn policy: how ambiguous corners are resolved.
///
/// `Minority` produces the fewest spurious corner artifacts on
/// high-contrast glyph masks and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPolicy {
    /// Prefer the color that occurs least frequently locally.
    #[default]
    Minority,
    /// Prefer the color that occurs most frequently locally.
    Majority,
    /// Always take a black turn.
    Black,
    /// Always take a white turn.
    White,
}

impl TurnPolicy {
    /// The potrace command-line spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minority => "minority",
            Self::Majority => "majority",
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// Tuning for a trace run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceOptions {
    /// Corner resolution policy.
    pub turn_policy: TurnPolicy,

    /// Corner smoothing threshold. 0.0 preserves sharp silhouette
    /// edges (right for symbolic glyphs); 1.0 smooths more freely.
    pub alphamax: f32,

    /// Curve optimization tolerance. Lower preserves fine detail over
    /// path simplification; the useful band is 0.1 to 0.2.
    pub opttolerance: f32,

    /// Time budget for the external process. The subprocess is killed
    /// on expiry — external tools can hang on malformed input.
    pub timeout: Duration,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            turn_policy: TurnPolicy::Minority,
            alphamax: 0.0,
            opttolerance: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A tracing backend: binary mask in, raw SVG text out.
pub trait VectorTracer {
    /// Trace the mask into an SVG document string.
    ///
    /// # Errors
    ///
    /// Returns a [`TraceError`] as documented on each variant.
    fn trace(&self, mask: &BinaryMask) -> Result<String, TraceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_favor_sharp_detail() {
        let opts = TraceOptions::default();
        assert_eq!(opts.turn_policy, TurnPolicy::Minority);
        assert!((opts.alphamax - 0.0).abs() < f32::EPSILON);
        assert!((opts.opttolerance - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn turn_policy_spellings_match_potrace() {
        assert_eq!(TurnPolicy::Minority.as_str(), "minority");
        assert_eq!(TurnPolicy::Majority.as_str(), "majority");
        assert_eq!(TurnPolicy::Black.as_str(), "black");
        assert_eq!(TurnPolicy::White.as_str(), "white");
    }
}
