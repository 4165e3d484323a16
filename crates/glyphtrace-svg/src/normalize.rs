//! Geometric normalization to a canonical canvas.
//!
//! Traced glyphs come out of potrace with whatever bounding geometry
//! the source artwork had, so two symbols rendered side by side as
//! graph nodes can differ wildly in visual weight. Normalization
//! rewrites a document into a fixed target canvas (default 100×100
//! with 10px padding): uniform scale (aspect preserved, whole glyph
//! fits), centered offsets, one wrapping `<g transform="…">`.
//!
//! Every normalized output has identical width/height/viewBox.

use std::fmt::Write;

use regex::Regex;

use crate::SvgError;
use crate::postprocess::CANONICAL_FILL;

/// The source coordinate system declared by an SVG document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Origin x.
    pub x: f64,
    /// Origin y.
    pub y: f64,
    /// Extent width.
    pub width: f64,
    /// Extent height.
    pub height: f64,
}

impl ViewBox {
    /// The viewBox assumed when a document declares none.
    pub const DEFAULT: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1000.0,
        height: 1000.0,
    };

    /// Parse the first `viewBox` attribute out of a document.
    ///
    /// # Errors
    ///
    /// Returns [`SvgError::Pattern`] only if the internal pattern
    /// fails to compile.
    pub fn parse(svg: &str) -> Result<Option<Self>, SvgError> {
        let re = Regex::new(r#"viewBox="([^"]+)""#)?;
        let Some(caps) = re.captures(svg) else {
            return Ok(None);
        };
        let values: Vec<f64> = caps[1]
            .split_whitespace()
            .filter_map(|v| v.parse().ok())
            .collect();
        let [x, y, width, height] = values[..] else {
            return Ok(None);
        };
        Ok(Some(Self {
            x,
            y,
            width,
            height,
        }))
    }
}

/// Axis-aligned bounds of path geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

/// Approximate content bounds from raw path data.
///
/// Numeric tokens in every `d="…"` attribute are read as alternating
/// x/y coordinates. This matches how potrace emits absolute move/line
/// data and is only used for diagnostics and tests — the normalizer
/// itself scales by viewBox, not content bounds.
///
/// # Errors
///
/// Returns [`SvgError::Pattern`] only if an internal pattern fails to
/// compile.
pub fn content_bounds(svg: &str) -> Result<Option<Bounds>, SvgError> {
    let paths = Regex::new(r#"\bd="([^"]+)""#)?;
    let numbers = Regex::new(r"-?\d+\.?\d*")?;

    let mut bounds: Option<Bounds> = None;
    for caps in paths.captures_iter(svg) {
        let coords: Vec<f64> = numbers
            .find_iter(&caps[1])
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        for pair in coords.chunks_exact(2) {
            let (x, y) = (pair[0], pair[1]);
            bounds = Some(bounds.map_or(
                Bounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                |b| Bounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            ));
        }
    }
    Ok(bounds)
}

/// Target canvas configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Output canvas edge in pixels.
    pub target_size: u32,
    /// Inner padding on every side in pixels.
    pub padding: u32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target_size: 100,
            padding: 10,
        }
    }
}

impl NormalizeOptions {
    /// Edge of the content area (target minus padding on both sides).
    #[must_use]
    pub const fn content_size(self) -> u32 {
        self.target_size.saturating_sub(2 * self.padding)
    }
}

/// Rescale and re-center a document into the target canvas.
///
/// The source viewBox (or [`ViewBox::DEFAULT`] when absent) defines the
/// content extent; a uniform scale fits it into the content area and
/// centering offsets place it. The original `<g>` content is preserved
/// under one new transform; any `<defs>` block rides along unchanged.
///
/// Documents with no locatable path content are returned unchanged and
/// a warning is logged — callers keep a usable (if unnormalized) glyph
/// rather than losing it.
///
/// # Errors
///
/// Returns [`SvgError::Pattern`] only if an internal pattern fails to
/// compile.
pub fn normalize(svg: &str, options: NormalizeOptions) -> Result<String, SvgError> {
    let viewbox = ViewBox::parse(svg)?
        .filter(|vb| vb.width > 0.0 && vb.height > 0.0)
        .unwrap_or(ViewBox::DEFAULT);

    let target = f64::from(options.target_size);
    let content_edge = f64::from(options.content_size());
    let scale = (content_edge / viewbox.width).min(content_edge / viewbox.height);
    let offset_x = (target - viewbox.width * scale) / 2.0;
    let offset_y = (target - viewbox.height * scale) / 2.0;

    let defs = Regex::new(r"(?s)<defs>.*?</defs>")?
        .find(svg)
        .map(|m| m.as_str().to_string());

    let fill = Regex::new(r#"fill="([^"]*)""#)?
        .captures(svg)
        .map_or_else(|| CANONICAL_FILL.to_string(), |c| c[1].to_string());

    let group = Regex::new(r#"(?s)<g[^>]*transform="([^"]*)"[^>]*>(.*?)</g>"#)?;
    let body = if let Some(caps) = group.captures(svg) {
        let original_transform = caps[1].trim().to_string();
        let content = caps[2].trim().to_string();
        Some((original_transform, content))
    } else {
        // No transformed group: fall back to collecting bare paths.
        let paths: Vec<&str> = Regex::new(r"<path[^>]*/?>")?
            .find_iter(svg)
            .map(|m| m.as_str())
            .collect();
        if paths.is_empty() {
            None
        } else {
            Some((String::new(), paths.join("\n")))
        }
    };

    let Some((original_transform, content)) = body else {
        tracing::warn!("no path content located, returning document unnormalized");
        return Ok(svg.to_string());
    };

    let transform = if original_transform.is_empty() {
        format!("translate({offset_x}, {offset_y}) scale({scale})")
    } else {
        format!("translate({offset_x}, {offset_y}) scale({scale}) {original_transform}")
    };

    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" xmlns="http://www.w3.org/2000/svg">"#,
        size = options.target_size,
    );
    if let Some(defs) = defs {
        let _ = writeln!(out, "  {defs}");
    }
    let _ = writeln!(out, r#"  <g transform="{transform}" fill="{fill}" stroke="none">"#);
    let _ = writeln!(out, "{content}");
    let _ = writeln!(out, "  </g>");
    let _ = write!(out, "</svg>");
    Ok(out)
}
