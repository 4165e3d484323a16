//! Emotion-palette colorization strategies.
//!
//! All strategies replace the canonical black-fill token established by
//! post-processing ([`CANONICAL_FILL`]), so colorization must run on a
//! post-processed document. Gradient-injecting strategies place their
//! `<defs>` immediately after the single root tag (replacing any
//! existing defs), which is what makes a second nested `<svg>` root
//! impossible by construction.

use regex::Regex;

use glyphtrace_emotion::Palette;

use crate::SvgError;
use crate::postprocess::CANONICAL_FILL;

/// Gradient id used by [`ColorStrategy::Gradient`].
pub const LINEAR_GRADIENT_ID: &str = "emotionGradient";

/// Gradient id used by [`ColorStrategy::Radial`].
pub const RADIAL_GRADIENT_ID: &str = "emotionalBlend";

/// How a palette is spliced into a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStrategy {
    /// Flat primary-color fill.
    #[default]
    Solid,
    /// Diagonal linear gradient primary → gradient → secondary.
    Gradient,
    /// Radial blend primary → secondary → dark, center outward.
    Radial,
    /// Primary fill with a dark outline stroke.
    Accent,
}

/// Apply a colorization strategy to a post-processed document.
///
/// # Errors
///
/// Returns [`SvgError::Pattern`] only if an internal pattern fails to
/// compile.
pub fn colorize(
    svg: &str,
    palette: &Palette,
    strategy: ColorStrategy,
) -> Result<String, SvgError> {
    match strategy {
        ColorStrategy::Solid => apply_solid(svg, &palette.primary),
        ColorStrategy::Gradient => {
            let defs = linear_gradient_defs(palette);
            let with_defs = install_defs(svg, &defs)?;
            replace_canonical_fill(&with_defs, &format!("url(#{LINEAR_GRADIENT_ID})"))
        }
        ColorStrategy::Radial => {
            let defs = radial_gradient_defs(palette);
            let with_defs = install_defs(svg, &defs)?;
            replace_canonical_fill(&with_defs, &format!("url(#{RADIAL_GRADIENT_ID})"))
        }
        ColorStrategy::Accent => apply_accent(svg, palette),
    }
}

/// Replace canonical fill and stroke with a flat color.
fn apply_solid(svg: &str, color: &str) -> Result<String, SvgError> {
    let re = Regex::new(&format!(r#"(fill|stroke)="{CANONICAL_FILL}""#))?;
    Ok(re.replace_all(svg, format!("${{1}}=\"{color}\"")).into_owned())
}

/// Primary fill with the palette dark as an outline stroke.
fn apply_accent(svg: &str, palette: &Palette) -> Result<String, SvgError> {
    let filled = replace_canonical_fill(svg, &palette.primary)?;
    let stroke = Regex::new(r#"stroke="(?:none|#000000)""#)?;
    Ok(stroke
        .replace_all(
            &filled,
            format!("stroke=\"{}\" stroke-width=\"1.5\"", palette.dark),
        )
        .into_owned())
}

/// Replace only `fill` attributes carrying the canonical token.
fn replace_canonical_fill(svg: &str, value: &str) -> Result<String, SvgError> {
    let re = Regex::new(&format!(r#"fill="{CANONICAL_FILL}""#))?;
    Ok(re.replace_all(svg, format!("fill=\"{value}\"")).into_owned())
}

/// The linear gradient defs block for a palette.
fn linear_gradient_defs(palette: &Palette) -> String {
    format!(
        concat!(
            "<defs>\n",
            "    <linearGradient id=\"{id}\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">\n",
            "        <stop offset=\"0%\" style=\"stop-color:{primary};stop-opacity:1\" />\n",
            "        <stop offset=\"50%\" style=\"stop-color:{gradient};stop-opacity:1\" />\n",
            "        <stop offset=\"100%\" style=\"stop-color:{secondary};stop-opacity:1\" />\n",
            "    </linearGradient>\n",
            "</defs>",
        ),
        id = LINEAR_GRADIENT_ID,
        primary = palette.primary,
        gradient = palette.gradient,
        secondary = palette.secondary,
    )
}

/// The radial gradient defs block for a palette.
fn radial_gradient_defs(palette: &Palette) -> String {
    format!(
        concat!(
            "<defs>\n",
            "    <radialGradient id=\"{id}\" cx=\"50%\" cy=\"50%\" r=\"50%\">\n",
            "        <stop offset=\"0%\" style=\"stop-color:{primary};stop-opacity:0.9\" />\n",
            "        <stop offset=\"70%\" style=\"stop-color:{secondary};stop-opacity:0.7\" />\n",
            "        <stop offset=\"100%\" style=\"stop-color:{dark};stop-opacity:1\" />\n",
            "    </radialGradient>\n",
            "</defs>",
        ),
        id = RADIAL_GRADIENT_ID,
        primary = palette.primary,
        secondary = palette.secondary,
        dark = palette.dark,
    )
}

/// Install a defs block: replace an existing `<defs>…</defs>` in place,
/// otherwise insert after the (single) root opening tag.
///
/// Only the first root tag is ever touched, so repeated colorization
/// cannot reproduce the nested-root defect.
fn install_defs(svg: &str, defs: &str) -> Result<String, SvgError> {
    let existing = Regex::new(r"(?s)<defs>.*?</defs>")?;
    if existing.is_match(svg) {
        return Ok(existing.replace(svg, defs).into_owned());
    }

    let root = Regex::new(r"<svg[^>]*>")?;
    Ok(root
        .replace(svg, |caps: &regex::Captures<'_>| {
            format!("{}\n{defs}", &caps[0])
        })
        .into_owned())
}
