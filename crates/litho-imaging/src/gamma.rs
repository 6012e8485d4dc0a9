//! Gamma correction: `out = (in / 255)^(1 / gamma) * 255`.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{CHANNELS, ensure_non_empty, put_gray, to_u8};
use crate::{ImagingError, Result};

/// Apply gamma correction to the red channel, writing grey with alpha 255.
///
/// `gamma == 1.0` leaves the grey level unchanged but still normalizes the
/// output to grey with alpha 255.
pub fn gamma_correct(img: &RgbaImage, gamma: f64) -> Result<RgbaImage> {
    if !(gamma.is_finite() && gamma > 0.0) {
        return Err(ImagingError::InvalidParameter(format!(
            "gamma must be positive, got {gamma}"
        )));
    }
    let (width, height) = img.dimensions();
    ensure_non_empty(width, height)?;

    debug!(width, height, gamma, "Applying gamma correction");

    let inv = 1.0 / gamma;
    let lut: [u8; 256] = std::array::from_fn(|v| to_u8((v as f64 / 255.0).powf(inv) * 255.0));

    let src: &[u8] = img;
    let mut out = RgbaImage::new(width, height);
    let samples: &mut [u8] = &mut out;
    samples
        .par_chunks_mut(CHANNELS)
        .zip(src.par_chunks(CHANNELS))
        .for_each(|(dst, src)| put_gray(dst, 0, lut[src[0] as usize]));

    Ok(out)
}
