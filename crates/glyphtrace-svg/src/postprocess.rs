//! Post-processing of raw tracer output.
//!
//! Potrace emits valid but loosely-styled SVG; colorization passes in
//! older tooling occasionally left behind a second `<svg>` opening tag
//! nested inside `<defs>`. This module establishes the invariants the
//! rest of the toolkit relies on: one canonical black-fill token, a
//! single well-formed root, and no dangling gradient references.
//!
//! Every operation here is idempotent.

use regex::Regex;

use crate::SvgError;

/// The single spelling of black all colorizers replace.
pub const CANONICAL_FILL: &str = "#000000";

/// Outcome of the full post-processing pass.
#[derive(Debug, Clone)]
pub struct Processed {
    /// The rewritten document.
    pub svg: String,
    /// Whether structural repair had to fix a nested-root defect.
    pub repaired: bool,
    /// Dangling gradient reference ids, reported but never dropped.
    pub warnings: Vec<String>,
}

fn pattern(re: &'static str) -> Result<Regex, SvgError> {
    Ok(Regex::new(re)?)
}

/// Rewrite every fill/stroke spelling of black (`#000`, `#000000`,
/// `black`) to the canonical token, so downstream colorizers have one
/// known target string to replace.
///
/// # Errors
///
/// Returns [`SvgError::Pattern`] only if an internal pattern fails to
/// compile.
pub fn canonicalize_fill(svg: &str) -> Result<String, SvgError> {
    let re = pattern(r#"(fill|stroke)="(?:#000000|#000|black)""#)?;
    Ok(re
        .replace_all(svg, format!("${{1}}=\"{CANONICAL_FILL}\""))
        .into_owned())
}

/// Whether the document shows the nested-root defect
/// (`<svg><defs>…</defs><svg …>`).
///
/// A legitimate document whose root happens to be a bare `<svg>` with
/// defs first has only one `<svg` tag and is not flagged.
fn has_nested_root(svg: &str) -> Result<bool, SvgError> {
    let bare_wrapper = pattern(r"<svg>\s*<defs>")?.is_match(svg);
    Ok(bare_wrapper && svg.matches("<svg").count() > 1)
}

/// Repair the nested-root defect.
///
/// The broken shape is a bare `<svg>` wrapper holding a `<defs>` block,
/// followed by the real root tag. The defs content is extracted, the
/// wrapper deleted, and the defs re-inserted immediately after the
/// legitimate `<svg …>` opening tag.
///
/// A well-formed document passes through byte-identical, and repairing
/// twice equals repairing once.
///
/// # Errors
///
/// Returns [`SvgError::Malformed`] when the document is identified as
/// broken but no extractable `<defs>` block can be found.
pub fn repair_structure(svg: &str) -> Result<(String, bool), SvgError> {
    if !has_nested_root(svg)? {
        return Ok((svg.to_string(), false));
    }

    let extract = pattern(r"(?s)<svg>\s*(<defs>.*?</defs>)\s*<svg")?;
    let Some(caps) = extract.captures(svg) else {
        return Err(SvgError::Malformed(
            "nested <svg> root found but no extractable <defs> content".to_string(),
        ));
    };
    let defs = caps[1].to_string();

    // Delete the malformed wrapper, keeping the legitimate root tag.
    let strip = pattern(r"(?s)<svg>\s*<defs>.*?</defs>\s*<svg")?;
    let stripped = strip.replace(svg, "<svg");

    // Re-insert the defs right after the real opening tag.
    let insert = pattern(r"<svg[^>]*>")?;
    let repaired = insert
        .replace(&stripped, |caps: &regex::Captures<'_>| {
            format!("{}\n{defs}", &caps[0])
        })
        .into_owned();

    Ok((repaired, true))
}

/// Find `fill="url(#X)"` references with no matching gradient
/// definition in the document.
///
/// Dangling references are diagnostics, not fatal: the renderer will
/// fall back to black, which is visible and debuggable.
///
/// # Errors
///
/// Returns [`SvgError::Pattern`] only if an internal pattern fails to
/// compile.
pub fn validate_references(svg: &str) -> Result<Vec<String>, SvgError> {
    let refs = pattern(r#"fill="url\(#([^)]+)\)""#)?;
    let defs = pattern(r#"<(?:linearGradient|radialGradient)[^>]*\bid="([^"]+)""#)?;

    let defined: Vec<&str> = defs.captures_iter(svg).map(|c| {
        // Indexing group 1 is safe: the pattern always captures it.
        c.get(1).map_or("", |m| m.as_str())
    }).collect();

    let mut dangling = Vec::new();
    for caps in refs.captures_iter(svg) {
        let id = caps.get(1).map_or("", |m| m.as_str());
        if !defined.contains(&id) && !dangling.iter().any(|d| d == id) {
            dangling.push(id.to_string());
        }
    }
    Ok(dangling)
}

/// Run the full post-processing pass: canonical fill, structural
/// repair, reference validation.
///
/// # Errors
///
/// Returns [`SvgError::Malformed`] from the repair step; pattern
/// errors indicate an internal defect.
pub fn postprocess(svg: &str) -> Result<Processed, SvgError> {
    let canonical = canonicalize_fill(svg)?;
    let (repaired_svg, repaired) = repair_structure(&canonical)?;
    let warnings = validate_references(&repaired_svg)?;

    if repaired {
        tracing::debug!("repaired nested <svg> root");
    }
    for id in &warnings {
        tracing::warn!(gradient = %id, "dangling gradient reference");
    }

    Ok(Processed {
        svg: repaired_svg,
        repaired,
        warnings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = concat!(
        "<?xml version=\"1.0\"?>\n",
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\n",
        "<g fill=\"#000000\" stroke=\"none\">\n",
        "<path d=\"M10 10 L90 90\"/>\n",
        "</g>\n",
        "</svg>",
    );

    fn broken_nested() -> String {
        concat!(
            "<svg><defs>\n",
            "<linearGradient id=\"emotionGradient\">\n",
            "<stop offset=\"0%\" style=\"stop-color:#FFD700\"/>\n",
            "</linearGradient>\n",
            "</defs><svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\n",
            "<g fill=\"url(#emotionGradient)\" stroke=\"none\">\n",
            "<path d=\"M10 10 L90 90\"/>\n",
            "</g>\n",
            "</svg>",
        )
        .to_string()
    }

    // --- canonicalize_fill ---

    #[test]
    fn all_black_spellings_become_canonical() {
        let svg = r##"<g fill="#000"><path stroke="black"/><path fill="black"/></g>"##;
        let out = canonicalize_fill(svg).unwrap();
        assert_eq!(
            out,
            r##"<g fill="#000000"><path stroke="#000000"/><path fill="#000000"/></g>"##,
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize_fill(WELL_FORMED).unwrap();
        let twice = canonicalize_fill(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn non_black_fills_are_untouched() {
        let svg = r##"<path fill="#FF0000" stroke="white"/>"##;
        assert_eq!(canonicalize_fill(svg).unwrap(), svg);
    }

    // --- repair_structure ---

    #[test]
    fn well_formed_document_is_untouched() {
        let (out, repaired) = repair_structure(WELL_FORMED).unwrap();
        assert!(!repaired);
        assert_eq!(out, WELL_FORMED);
    }

    #[test]
    fn nested_root_is_repaired() {
        let (out, repaired) = repair_structure(&broken_nested()).unwrap();
        assert!(repaired);
        assert_eq!(out.matches("<svg").count(), 1, "single root:\n{out}");
        assert!(out.contains("<defs>"));
        assert!(out.contains("emotionGradient"));
        // Defs come after the real root tag.
        let root = out.find("<svg xmlns").unwrap();
        let defs = out.find("<defs>").unwrap();
        assert!(defs > root);
    }

    #[test]
    fn repair_is_idempotent_on_broken_input() {
        let (once, _) = repair_structure(&broken_nested()).unwrap();
        let (twice, repaired_again) = repair_structure(&once).unwrap();
        assert!(!repaired_again);
        assert_eq!(once, twice);
    }

    #[test]
    fn bare_root_with_defs_is_not_flagged_as_broken() {
        // A single-root document that legitimately starts `<svg><defs>`.
        let svg = concat!(
            "<svg><defs><linearGradient id=\"a\"/></defs>",
            "<path fill=\"url(#a)\"/></svg>",
        );
        let (out, repaired) = repair_structure(svg).unwrap();
        assert!(!repaired);
        assert_eq!(out, svg);
    }

    #[test]
    fn broken_document_without_defs_is_malformed() {
        // The nested-root signature without a closing </defs>.
        let svg = "<svg><defs><linearGradient id=\"g\"/><svg viewBox=\"0 0 10 10\"/>";
        let result = repair_structure(svg);
        assert!(matches!(result, Err(SvgError::Malformed(_))));
    }

    #[test]
    fn repaired_document_keeps_gradient_reference_valid() {
        let (out, _) = repair_structure(&broken_nested()).unwrap();
        assert!(validate_references(&out).unwrap().is_empty());
    }

    // --- validate_references ---

    #[test]
    fn resolving_references_produce_no_warnings() {
        let svg = concat!(
            "<svg><defs><linearGradient id=\"a\"/></defs>",
            "<path fill=\"url(#a)\"/></svg>",
        );
        assert!(validate_references(svg).unwrap().is_empty());
    }

    #[test]
    fn dangling_reference_is_reported() {
        let svg = "<svg><path fill=\"url(#missing)\"/></svg>";
        assert_eq!(validate_references(svg).unwrap(), vec!["missing"]);
    }

    #[test]
    fn duplicate_dangling_references_are_reported_once() {
        let svg = concat!(
            "<svg><path fill=\"url(#m)\"/>",
            "<path fill=\"url(#m)\"/></svg>",
        );
        assert_eq!(validate_references(svg).unwrap(), vec!["m"]);
    }

    #[test]
    fn radial_gradient_definitions_count() {
        let svg = concat!(
            "<svg><defs><radialGradient id=\"blend\"/></defs>",
            "<path fill=\"url(#blend)\"/></svg>",
        );
        assert!(validate_references(svg).unwrap().is_empty());
    }

    // --- postprocess ---

    #[test]
    fn full_pass_on_clean_tracer_output() {
        let svg = WELL_FORMED.replace("#000000", "black");
        let processed = postprocess(&svg).unwrap();
        assert!(!processed.repaired);
        assert!(processed.warnings.is_empty());
        assert!(processed.svg.contains("fill=\"#000000\""));
        assert!(!processed.svg.contains("fill=\"black\""));
    }

    #[test]
    fn full_pass_repairs_and_reports() {
        let mut svg = broken_nested();
        svg.push_str("<path fill=\"url(#ghost)\"/>");
        let processed = postprocess(&svg).unwrap();
        assert!(processed.repaired);
        assert_eq!(processed.warnings, vec!["ghost"]);
        assert_eq!(processed.svg.matches("<svg").count(), 1);
    }

    #[test]
    fn full_pass_is_idempotent() {
        let first = postprocess(&broken_nested()).unwrap();
        let second = postprocess(&first.svg).unwrap();
        assert!(!second.repaired);
        assert_eq!(first.svg, second.svg);
    }
}
