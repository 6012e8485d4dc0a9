//! Median denoise filter.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{CHANNELS, ensure_non_empty, put_gray, red_plane};
use crate::{ImagingError, Result};

/// Default median window (3x3).
pub const DEFAULT_KERNEL_SIZE: u32 = 3;

/// Replace every pixel with the median of its `kernel_size` x `kernel_size`
/// neighbourhood.
///
/// Coordinates outside the image clamp to the nearest edge pixel. The grey
/// value is read from the red channel; the output is grey with alpha 255.
pub fn median_filter(img: &RgbaImage, kernel_size: u32) -> Result<RgbaImage> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(ImagingError::InvalidKernel(kernel_size));
    }
    let (width, height) = img.dimensions();
    ensure_non_empty(width, height)?;
    debug!(width, height, kernel_size, "Applying median filter");

    let src = red_plane(img);
    let w = width as usize;
    let h = height as usize;
    let half = (kernel_size / 2) as isize;
    let window_len = (kernel_size * kernel_size) as usize;

    let mut out = RgbaImage::new(width, height);
    let samples: &mut [u8] = &mut out;
    samples
        .par_chunks_mut(w * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let mut window = Vec::with_capacity(window_len);
            for x in 0..w {
                window.clear();
                for ky in -half..=half {
                    let yy = clamp_index(y as isize + ky, h);
                    for kx in -half..=half {
                        let xx = clamp_index(x as isize + kx, w);
                        window.push(src[yy * w + xx]);
                    }
                }
                window.sort_unstable();
                put_gray(row, x, window[window.len() / 2]);
            }
        });

    Ok(out)
}

#[inline]
pub(crate) fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
