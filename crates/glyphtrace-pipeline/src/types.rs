//! Shared types for the glyph mask pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// original decoded image without depending on `image` directly.
pub use image::RgbaImage;

/// Ink value in a [`BinaryMask`] (glyph strokes).
pub const INK: u8 = 0;

/// Background value in a [`BinaryMask`].
pub const BACKGROUND: u8 = 255;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A strict two-level mask: every pixel is [`INK`] (0) or
/// [`BACKGROUND`] (255), glyph rendered as black ink on white.
///
/// The invariant is established at construction and preserved by the
/// morphology operations, so downstream consumers (the tracer in
/// particular) never see midtones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    /// Wrap an image that is already two-level, snapping any midtone
    /// defensively: values below 128 become ink, the rest background.
    #[must_use]
    pub fn from_gray(image: &GrayImage) -> Self {
        let snapped = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            if image.get_pixel(x, y).0[0] < 128 {
                image::Luma([INK])
            } else {
                image::Luma([BACKGROUND])
            }
        });
        Self(snapped)
    }

    /// Wrap an image known to contain only 0/255 values.
    ///
    /// Internal constructor for the binarizer and morphology passes,
    /// which produce two-level output by construction.
    pub(crate) const fn from_two_level(image: GrayImage) -> Self {
        Self(image)
    }

    /// The underlying grayscale image.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.0
    }

    /// Consume the mask, returning the underlying image.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.0
    }

    /// Mask dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.0.width(),
            height: self.0.height(),
        }
    }

    /// Fraction of pixels that are ink, in `[0, 1]`.
    #[must_use]
    pub fn ink_ratio(&self) -> f64 {
        let total = self.0.pixels().len();
        if total == 0 {
            return 0.0;
        }
        let ink = self.0.pixels().filter(|p| p.0[0] == INK).count();
        #[allow(clippy::cast_precision_loss)]
        {
            ink as f64 / total as f64
        }
    }

    /// Whether every pixel has the same value (a degenerate mask that
    /// would trace to nothing).
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        let mut pixels = self.0.pixels();
        let Some(first) = pixels.next() else {
            return true;
        };
        pixels.all(|p| p.0[0] == first.0[0])
    }

    /// Swap ink and background, for sources drawn bright-on-dark.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let inverted = GrayImage::from_fn(self.0.width(), self.0.height(), |x, y| {
            image::Luma([BACKGROUND - self.0.get_pixel(x, y).0[0]])
        });
        Self(inverted)
    }
}

/// How the binarization cut value is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// A fixed cut value (128 typical).
    Fixed(u8),
    /// Cut at `mean intensity × factor` after an autocontrast stretch.
    ///
    /// The 0.75 default factor is empirically chosen for high-contrast
    /// glyph renders; it is a parameter rather than a constant because
    /// no rationale exists for other image styles.
    Aggressive {
        /// Multiplier applied to the mean intensity.
        factor: f32,
    },
    /// Otsu's method: the cut maximizing between-class variance of the
    /// intensity histogram. Deterministic and exact.
    Otsu,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Otsu
    }
}

impl ThresholdMethod {
    /// The conventional aggressive configuration (`factor = 0.75`).
    #[must_use]
    pub const fn aggressive() -> Self {
        Self::Aggressive { factor: 0.75 }
    }
}

/// Configuration for the mask pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How the binarization cut is chosen.
    pub threshold: ThresholdMethod,

    /// Whether to run morphological cleanup (fill holes, then one
    /// iteration each of opening and closing) on the mask.
    pub cleanup: bool,

    /// Whether to swap ink and background after thresholding, for
    /// glyphs drawn bright-on-dark (e.g. gold on black).
    pub invert: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Otsu,
            cleanup: true,
            invert: false,
        }
    }
}

/// Result of running the mask pipeline.
#[derive(Debug, Clone)]
pub struct MaskResult {
    /// The two-level mask, ink black on white.
    pub mask: BinaryMask,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
    /// The cut value the binarizer settled on.
    pub cut: u8,
}

/// Errors that can occur during mask pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Binarization produced a single-color mask with nothing to trace.
    #[error("binarization produced an empty mask (single color)")]
    EmptyMask,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
