//! A tracing backend that returns canned SVG text.
//!
//! Lets the rest of the pipeline be exercised without potrace
//! installed: tests hand it the SVG they want "traced" and assert on
//! everything downstream.

use glyphtrace_pipeline::BinaryMask;

use crate::{TraceError, VectorTracer};

/// Backend returning a fixed SVG document for every mask.
#[derive(Debug, Clone)]
pub struct CannedTracer {
    svg: String,
}

impl CannedTracer {
    /// A tracer that always returns `svg`.
    #[must_use]
    pub fn new(svg: impl Into<String>) -> Self {
        Self { svg: svg.into() }
    }

    /// A tracer returning a minimal single-path document shaped like
    /// potrace output: one filled rectangle covering `width` × `height`.
    #[must_use]
    pub fn rectangle(width: u32, height: u32) -> Self {
        let svg = format!(
            concat!(
                "<?xml version=\"1.0\" standalone=\"no\"?>\n",
                "<svg version=\"1.0\" xmlns=\"http://www.w3.org/2000/svg\"\n",
                " width=\"{w}pt\" height=\"{h}pt\" viewBox=\"0 0 {w} {h}\"\n",
                " preserveAspectRatio=\"xMidYMid meet\">\n",
                "<g transform=\"translate(0,{h}) scale(0.1,-0.1)\"\n",
                "fill=\"#000000\" stroke=\"none\">\n",
                "<path d=\"M0 0 L{w10} 0 L{w10} {h10} L0 {h10} Z\"/>\n",
                "</g>\n",
                "</svg>\n",
            ),
            w = width,
            h = height,
            w10 = width * 10,
            h10 = height * 10,
        );
        Self::new(svg)
    }
}

impl VectorTracer for CannedTracer {
    fn trace(&self, _mask: &BinaryMask) -> Result<String, TraceError> {
        Ok(self.svg.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use glyphtrace_pipeline::GrayImage;

    use super::*;

    fn any_mask() -> BinaryMask {
        BinaryMask::from_gray(&GrayImage::from_pixel(2, 2, image::Luma([0])))
    }

    #[test]
    fn returns_the_canned_text_verbatim() {
        let tracer = CannedTracer::new("<svg><path d=\"M0 0\"/></svg>");
        let svg = tracer.trace(&any_mask()).unwrap();
        assert_eq!(svg, "<svg><path d=\"M0 0\"/></svg>");
    }

    #[test]
    fn rectangle_looks_like_potrace_output() {
        let svg = CannedTracer::rectangle(80, 60).trace(&any_mask()).unwrap();
        assert!(svg.contains("viewBox=\"0 0 80 60\""));
        assert!(svg.contains("fill=\"#000000\""));
        assert!(svg.contains("<path"));
        assert!(svg.contains("scale(0.1,-0.1)"));
    }
}
