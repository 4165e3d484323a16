//! Image decoding, alpha flattening, grayscale, and contrast stretch.
//!
//! This is the first stage of the pipeline: raw bytes in, a
//! contrast-stretched `GrayImage` out. Any alpha channel is composited
//! over a white background first so transparency never reads as dark
//! content in the grayscale transform.

use image::{GrayImage, RgbaImage};

use crate::types::PipelineError;

/// Lower percentile clipped by the contrast stretch.
const STRETCH_LOW_PCT: f64 = 2.0;
/// Upper percentile clipped by the contrast stretch.
const STRETCH_HIGH_PCT: f64 = 98.0;

/// Decode raw image bytes into RGBA.
///
/// Supports whatever the `image` crate can decode with the enabled
/// features (PNG, JPEG, BMP, WebP).
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty and
/// [`PipelineError::Decode`] if the data is corrupt or unrecognized.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Composite an RGBA image over a white background.
///
/// Fully opaque pixels pass through; transparent pixels become white,
/// partial alpha blends linearly per channel.
#[must_use = "returns the flattened image"]
pub fn flatten_onto_white(image: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| -> u8 {
            let num = u16::from(c) * alpha + 255 * (255 - alpha);
            #[allow(clippy::cast_possible_truncation)]
            {
                (num / 255) as u8
            }
        };
        image::Rgba([blend(r), blend(g), blend(b), 255])
    })
}

/// Convert RGBA to single-channel grayscale using the standard
/// luminance weighting `0.299 R + 0.587 G + 0.114 B`.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        let luma = f64::from(r).mul_add(0.299, f64::from(g).mul_add(0.587, f64::from(b) * 0.114));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        image::Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Intensity value at a given percentile of the image histogram.
///
/// `pct` is in `[0, 100]`. Returns 0 for an empty image.
#[must_use]
fn percentile(image: &GrayImage, pct: f64) -> u8 {
    let total = image.pixels().len();
    if total == 0 {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for p in image.pixels() {
        histogram[usize::from(p.0[0])] += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let rank = (pct / 100.0 * total as f64).ceil().max(1.0);
    let mut cumulative = 0.0;
    for (value, count) in histogram.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        {
            cumulative += *count as f64;
        }
        if cumulative >= rank {
            #[allow(clippy::cast_possible_truncation)]
            return value as u8;
        }
    }
    255
}

/// Linearly rescale intensities so `[low, high]` maps onto `[0, 255]`,
/// clipping values outside the band.
///
/// Returns the image unchanged when `low >= high` (a flat histogram
/// where rescaling is meaningless).
#[must_use = "returns the stretched image"]
pub fn stretch_between(image: &GrayImage, low: u8, high: u8) -> GrayImage {
    if low >= high {
        return image.clone();
    }

    let low_f = f64::from(low);
    let span = f64::from(high) - low_f;
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = f64::from(image.get_pixel(x, y).0[0]);
        let stretched = ((v - low_f) * 255.0 / span).clamp(0.0, 255.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        image::Luma([stretched.round() as u8])
    })
}

/// Percentile-clipping contrast stretch (2nd/98th percentiles).
#[must_use = "returns the stretched image"]
pub fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let low = percentile(image, STRETCH_LOW_PCT);
    let high = percentile(image, STRETCH_HIGH_PCT);
    stretch_between(image, low, high)
}

/// Autocontrast with a symmetric percentile cutoff, used by the
/// aggressive threshold method for stronger class separation.
///
/// `cutoff_pct` is clipped from each end of the histogram (5.0 matches
/// the conventional aggressive configuration).
#[must_use = "returns the stretched image"]
pub fn autocontrast(image: &GrayImage, cutoff_pct: f64) -> GrayImage {
    let low = percentile(image, cutoff_pct);
    let high = percentile(image, 100.0 - cutoff_pct);
    stretch_between(image, low, high)
}

/// Run the full preprocessing chain: decode, flatten alpha onto white,
/// grayscale, percentile contrast stretch.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or [`PipelineError::Decode`]
/// from the decode step.
pub fn preprocess(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    let rgba = decode_rgba(bytes)?;
    let flattened = flatten_onto_white(&rgba);
    let gray = to_grayscale(&flattened);
    Ok(stretch_contrast(&gray))
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

    // --- decode_rgba ---

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode_rgba(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_decode_error() {
        let result = decode_rgba(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn valid_png_decodes() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let decoded = decode_rgba(&png_bytes(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
    }

    // --- flatten_onto_white ---

    #[test]
    fn transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn opaque_pixels_pass_through() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([12, 34, 56, 255]));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [12, 34, 56, 255]);
    }

    #[test]
    fn half_alpha_black_blends_to_mid_gray() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&img);
        let [r, g, b, a] = flat.get_pixel(0, 0).0;
        assert_eq!(a, 255);
        // 0*128/255 + 255*127/255 = 127
        assert_eq!([r, g, b], [127, 127, 127]);
    }

    // --- to_grayscale ---

    #[test]
    fn luminance_weighting_orders_channels() {
        let red = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255])));
        let green = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 0, 255])));
        let blue = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255])));

        let r = red.get_pixel(0, 0).0[0];
        let g = green.get_pixel(0, 0).0[0];
        let b = blue.get_pixel(0, 0).0[0];
        assert!(g > r && r > b, "expected G > R > B, got R={r} G={g} B={b}");
    }

    #[test]
    fn white_maps_to_255_black_to_0() {
        let white = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([255; 4])));
        assert_eq!(white.get_pixel(0, 0).0[0], 255);

        let black = to_grayscale(&RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255])));
        assert_eq!(black.get_pixel(0, 0).0[0], 0);
    }

    // --- stretch ---

    #[test]
    fn stretch_expands_narrow_band() {
        // Intensities 100 and 150 should stretch toward 0 and 255.
        let img = GrayImage::from_fn(10, 1, |x, _| {
            image::Luma([if x < 5 { 100 } else { 150 }])
        });
        let stretched = stretch_between(&img, 100, 150);
        assert_eq!(stretched.get_pixel(0, 0).0[0], 0);
        assert_eq!(stretched.get_pixel(9, 0).0[0], 255);
    }

    #[test]
    fn stretch_with_flat_band_is_identity() {
        let img = GrayImage::from_pixel(4, 4, image::Luma([77]));
        let stretched = stretch_between(&img, 77, 77);
        assert_eq!(stretched, img);
    }

    #[test]
    fn stretch_clips_outliers() {
        let img = GrayImage::from_fn(3, 1, |x, _| image::Luma([match x {
            0 => 10,
            1 => 128,
            _ => 240,
        }]));
        let stretched = stretch_between(&img, 50, 200);
        assert_eq!(stretched.get_pixel(0, 0).0[0], 0);
        assert_eq!(stretched.get_pixel(2, 0).0[0], 255);
    }

    // --- preprocess end-to-end ---

    #[test]
    fn preprocess_produces_full_range_for_bimodal_input() {
        let img = RgbaImage::from_fn(20, 20, |x, _| {
            if x < 10 {
                image::Rgba([40, 40, 40, 255])
            } else {
                image::Rgba([200, 200, 200, 255])
            }
        });
        let gray = preprocess(&png_bytes(&img)).unwrap();
        let min = gray.pixels().map(|p| p.0[0]).min().unwrap();
        let max = gray.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn preprocess_keeps_dimensions() {
        let img = RgbaImage::from_pixel(17, 31, image::Rgba([128, 64, 32, 255]));
        let gray = preprocess(&png_bytes(&img)).unwrap();
        assert_eq!(gray.dimensions(), (17, 31));
    }
}
