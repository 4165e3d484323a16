//! glyphtrace-pipeline: pure raster-to-mask pipeline (sans-IO).
//!
//! Converts raster glyph artwork into a strict black/white mask through:
//! decode -> alpha flattening -> grayscale -> contrast stretch ->
//! threshold -> optional morphological cleanup.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Tracing the mask into
//! vector paths lives in `glyphtrace-trace`; everything touching the
//! filesystem lives in the CLI.

pub mod binarize;
pub mod morphology;
pub mod preprocess;
pub mod types;

pub use types::{
    BACKGROUND, BinaryMask, Dimensions, GrayImage, INK, MaskResult, PipelineConfig, PipelineError,
    RgbaImage, ThresholdMethod,
};

/// Run the full mask pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces a [`MaskResult`] containing the two-level mask, the
/// source dimensions, and the cut value the binarizer settled on.
///
/// # Pipeline steps
///
/// 1. Decode, flatten alpha over white, grayscale, contrast stretch
/// 2. Threshold (fixed / aggressive / Otsu)
/// 3. Optional ink/background inversion (bright-on-dark sources)
/// 4. Optional morphological cleanup (fill holes, open, close)
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty,
/// [`PipelineError::Decode`] if the image cannot be decoded,
/// [`PipelineError::InvalidConfig`] for a bad aggressive factor, and
/// [`PipelineError::EmptyMask`] if binarization leaves a single color.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<MaskResult, PipelineError> {
    // 1. Decode and normalize to a contrast-stretched grayscale image.
    let gray = preprocess::preprocess(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    // 2. Threshold.
    let (mask, cut) = binarize::binarize(&gray, config.threshold)?;

    // 3. Optional inversion for bright-on-dark glyph renders.
    let mask = if config.invert { mask.inverted() } else { mask };

    // 4. Optional morphological cleanup.
    let mask = if config.cleanup {
        morphology::cleanup(&mask)
    } else {
        mask
    };

    // Cleanup can erase a sparse mask entirely; re-check before
    // handing a degenerate mask to the tracer.
    if mask.is_uniform() {
        return Err(PipelineError::EmptyMask);
    }

    Ok(MaskResult {
        mask,
        dimensions,
        cut,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode an RGBA image as PNG bytes.
    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    /// A filled dark circle on a white background.
    fn circle_png(size: u32, radius: f64) -> Vec<u8> {
        let center = f64::from(size) / 2.0;
        let img = RgbaImage::from_fn(size, size, |x, y| {
            let dx = f64::from(x) - center;
            let dy = f64::from(y) - center;
            if (dx * dx + dy * dy).sqrt() <= radius {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        png_bytes(&img)
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn process_uniform_image_returns_empty_mask() {
        let img = RgbaImage::from_pixel(20, 20, image::Rgba([128, 128, 128, 255]));
        let result = process(&png_bytes(&img), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyMask)));
    }

    #[test]
    fn circle_survives_the_default_pipeline() {
        let result = process(&circle_png(64, 20.0), &PipelineConfig::default()).unwrap();
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 64,
                height: 64
            },
        );
        // pi * 20^2 / 64^2 ≈ 0.31; cleanup may nibble the rim slightly.
        let ratio = result.mask.ink_ratio();
        assert!(
            (0.25..=0.36).contains(&ratio),
            "unexpected ink ratio {ratio}",
        );
    }

    #[test]
    fn invert_flips_ink_and_background() {
        let config = PipelineConfig {
            invert: true,
            cleanup: false,
            ..PipelineConfig::default()
        };
        let straight = process(&circle_png(64, 20.0), &PipelineConfig {
            cleanup: false,
            ..PipelineConfig::default()
        })
        .unwrap();
        let inverted = process(&circle_png(64, 20.0), &config).unwrap();
        assert!(
            (straight.mask.ink_ratio() + inverted.mask.ink_ratio() - 1.0).abs() < 1e-9,
            "ink ratios should be complementary",
        );
    }

    #[test]
    fn transparent_background_is_treated_as_white() {
        // Dark circle on a fully transparent background.
        let size = 48u32;
        let img = RgbaImage::from_fn(size, size, |x, y| {
            let dx = f64::from(x) - 24.0;
            let dy = f64::from(y) - 24.0;
            if (dx * dx + dy * dy).sqrt() <= 14.0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 0, 0])
            }
        });
        let result = process(&png_bytes(&img), &PipelineConfig::default()).unwrap();
        // Without alpha flattening the whole frame would binarize to
        // ink; with it, only the circle does.
        let ratio = result.mask.ink_ratio();
        assert!(ratio < 0.5, "transparent region misread as ink: {ratio}");
    }

    #[test]
    fn cleanup_disabled_preserves_raw_threshold() {
        let config = PipelineConfig {
            cleanup: false,
            ..PipelineConfig::default()
        };
        let result = process(&circle_png(32, 10.0), &config).unwrap();
        assert!(!result.mask.is_uniform());
    }
}
