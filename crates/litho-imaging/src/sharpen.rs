//! Unsharp mask sharpening.
//!
//! The blur is a single horizontal Gaussian pass; the sharpened value is
//! `original + amount * (original - blurred)`.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{CHANNELS, ensure_non_empty, put_gray, red_plane, to_u8};
use crate::denoise::clamp_index;
use crate::{ImagingError, Result};

/// Default sharpening strength.
pub const DEFAULT_AMOUNT: f64 = 1.5;

/// Default blur radius in pixels.
pub const DEFAULT_RADIUS: f64 = 1.0;

/// Normalized 1D Gaussian kernel for `radius`.
///
/// Half-width is `ceil(3 * radius)` taps and sigma is `radius / 3`.
pub fn gaussian_kernel(radius: f64) -> Vec<f64> {
    let half = (radius * 3.0).ceil() as isize;
    let sigma = radius / 3.0;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let raw: Vec<f64> = (-half..=half)
        .map(|x| (-((x * x) as f64) / two_sigma_sq).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

/// Sharpen with an unsharp mask.
///
/// Reads the red channel as grey, blurs each row with [`gaussian_kernel`]
/// (edge-clamped), rounds the blur to 8 bits and writes the clamped result
/// as grey with alpha 255.
pub fn unsharp_mask(img: &RgbaImage, amount: f64, radius: f64) -> Result<RgbaImage> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(ImagingError::InvalidParameter(format!(
            "sharpen radius must be positive, got {radius}"
        )));
    }
    if !amount.is_finite() {
        return Err(ImagingError::InvalidParameter(format!(
            "sharpen amount must be finite, got {amount}"
        )));
    }
    let (width, height) = img.dimensions();
    ensure_non_empty(width, height)?;

    let kernel = gaussian_kernel(radius);
    debug!(width, height, amount, radius, taps = kernel.len(), "Applying unsharp mask");

    let src = red_plane(img);
    let w = width as usize;
    let half = (kernel.len() / 2) as isize;

    let mut out = RgbaImage::new(width, height);
    let samples: &mut [u8] = &mut out;
    samples
        .par_chunks_mut(w * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let line = &src[y * w..(y + 1) * w];
            for x in 0..w {
                let blurred: f64 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let xx = clamp_index(x as isize + k as isize - half, w);
                        f64::from(line[xx]) * weight
                    })
                    .sum();
                let blurred = to_u8(blurred);

                let original = f64::from(line[x]);
                let mask = original - f64::from(blurred);
                put_gray(row, x, to_u8(original + mask * amount));
            }
        });

    Ok(out)
}
