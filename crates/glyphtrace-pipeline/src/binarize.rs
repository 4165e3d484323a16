//! Threshold selection and two-level mask production.
//!
//! Three cut strategies are supported: a fixed value, an aggressive
//! mean-scaled cut (preceded by an autocontrast stretch), and Otsu's
//! method. Otsu is the default: it picks the cut maximizing
//! between-class variance of the 256-bin intensity histogram — a
//! closed-form, single-pass statistical computation, not an iterative
//! approximation.

use image::GrayImage;

use crate::preprocess::autocontrast;
use crate::types::{BACKGROUND, BinaryMask, INK, PipelineError, ThresholdMethod};

/// Percentile cutoff used by the aggressive method's autocontrast pass.
const AGGRESSIVE_CUTOFF_PCT: f64 = 5.0;

/// 256-bin intensity histogram of a grayscale image.
#[must_use]
pub fn histogram(image: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for p in image.pixels() {
        bins[usize::from(p.0[0])] += 1;
    }
    bins
}

/// Mean pixel intensity, 0.0 for an empty image.
#[must_use]
pub fn mean_intensity(image: &GrayImage) -> f64 {
    let total = image.pixels().len();
    if total == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| u64::from(p.0[0])).sum();
    #[allow(clippy::cast_precision_loss)]
    {
        sum as f64 / total as f64
    }
}

/// Otsu's optimal threshold.
///
/// For every candidate cut `t`, the between-class variance is
/// `w_bg(t) · w_fg(t) · (mean_bg(t) − mean_fg(t))²`; the first cut
/// attaining the maximum wins. One O(N) histogram pass followed by an
/// O(256) scan.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let bins = histogram(image);
    let total = image.pixels().len() as f64;
    if total == 0.0 {
        return 0;
    }

    let sum_total: f64 = bins
        .iter()
        .enumerate()
        .map(|(value, count)| value as f64 * *count as f64)
        .sum();

    let mut sum_bg = 0.0;
    let mut weight_bg = 0.0;
    let mut max_variance = 0.0;
    let mut cut = 0u8;

    for (value, count) in bins.iter().enumerate() {
        let count = *count as f64;
        weight_bg += count;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }

        sum_bg += value as f64 * count;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_total - sum_bg) / weight_fg;

        let variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);
        if variance > max_variance {
            max_variance = variance;
            cut = value as u8;
        }
    }

    cut
}

/// Apply a scalar cut: intensity below `cut` becomes ink (black),
/// everything else background (white).
#[must_use = "returns the thresholded mask"]
pub fn apply_threshold(image: &GrayImage, cut: u8) -> BinaryMask {
    let mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] < cut {
            image::Luma([INK])
        } else {
            image::Luma([BACKGROUND])
        }
    });
    BinaryMask::from_two_level(mask)
}

/// Binarize a grayscale image with the given method.
///
/// Returns the mask and the cut value actually used.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a non-positive or
/// non-finite aggressive factor, and [`PipelineError::EmptyMask`] if
/// the resulting mask is entirely one color.
pub fn binarize(
    image: &GrayImage,
    method: ThresholdMethod,
) -> Result<(BinaryMask, u8), PipelineError> {
    let (mask, cut) = match method {
        ThresholdMethod::Fixed(cut) => (apply_threshold(image, cut), cut),
        ThresholdMethod::Aggressive { factor } => {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "aggressive threshold factor must be positive, got {factor}",
                )));
            }
            let stretched = autocontrast(image, AGGRESSIVE_CUTOFF_PCT);
            let cut_f = mean_intensity(&stretched) * f64::from(factor);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cut = cut_f.clamp(0.0, 255.0).round() as u8;
            (apply_threshold(&stretched, cut), cut)
        }
        ThresholdMethod::Otsu => {
            // The Otsu cut marks the last background bin, so ink is
            // "at most cut": threshold at cut + 1.
            let cut = otsu_threshold(image);
            (apply_threshold(image, cut.saturating_add(1)), cut)
        }
    };

    if mask.is_uniform() {
        return Err(PipelineError::EmptyMask);
    }
    Ok((mask, cut))
}
