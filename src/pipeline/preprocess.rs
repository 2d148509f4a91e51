//! Preprocessing: condition a photographed expression for recognition.
//!
//! ## Why preprocess at all?
//!
//! Tesseract is built for scanned documents: dark, clean glyphs on a white
//! page. A webcam photo or canvas sketch is none of that — low contrast,
//! colour noise, thin strokes a few pixels wide. Four pure transforms close
//! the gap:
//!
//! 1. grayscale   — colour carries no information for glyph shapes
//! 2. upscale     — 3× gives strokes enough pixels for feature detection
//! 3. autocontrast — stretch the observed luminance range to the full 0–255
//! 4. binarize    — hard threshold to pure black-and-white
//!
//! The order matters: contrast stretching before binarisation makes the fixed
//! threshold behave consistently across dim and bright photos.

use crate::config::SolveConfig;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use tracing::debug;

/// Upper bound on either output dimension after upscaling.
///
/// The upscale factor quietly backs off (never below 1×) when the result
/// would exceed this, so a full-resolution phone photo cannot balloon into a
/// multi-gigabyte buffer.
pub const MAX_UPSCALED_DIM: u32 = 8192;

/// Run the full preprocessing chain on a decoded bitmap.
///
/// Pure transform, no error paths: any valid bitmap in, a black-and-white
/// bitmap out.
pub fn prepare_for_recognition(img: &DynamicImage, config: &SolveConfig) -> GrayImage {
    let gray = img.to_luma8();
    let factor = effective_factor(gray.width(), gray.height(), config.upscale_factor);
    let scaled = upscale(&gray, factor);
    let stretched = autocontrast(&scaled);
    let bw = binarize(&stretched, config.binarize_threshold);
    debug!(
        "Preprocessed {}x{} → {}x{} (factor {}, threshold {})",
        img.width(),
        img.height(),
        bw.width(),
        bw.height(),
        factor,
        config.binarize_threshold
    );
    bw
}

/// Largest factor `1..=requested` whose result stays within [`MAX_UPSCALED_DIM`].
fn effective_factor(width: u32, height: u32, requested: u32) -> u32 {
    let longest = width.max(height).max(1);
    (1..=requested.max(1))
        .rev()
        .find(|f| longest.saturating_mul(*f) <= MAX_UPSCALED_DIM)
        .unwrap_or(1)
}

/// Upscale both dimensions by `factor` using Lanczos resampling.
pub fn upscale(img: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return img.clone();
    }
    imageops::resize(
        img,
        img.width() * factor,
        img.height() * factor,
        FilterType::Lanczos3,
    )
}

/// Stretch the observed luminance range linearly onto 0–255.
///
/// A flat image (every pixel identical) is returned unchanged; there is no
/// range to stretch and dividing by zero helps nobody.
pub fn autocontrast(img: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for p in img.pixels() {
        min = min.min(p[0]);
        max = max.max(p[0]);
    }
    if min >= max {
        return img.clone();
    }
    let range = (max - min) as u32;
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = (((p[0] - min) as u32 * 255) / range) as u8;
    }
    out
}

/// Binarize: luminance strictly above `threshold` becomes white (255),
/// everything else black (0).
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > threshold { 255 } else { 0 };
    }
    out
}
