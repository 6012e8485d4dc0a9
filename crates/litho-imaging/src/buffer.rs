//! Pixel buffer helpers shared by the filters.
//!
//! Filters read a single grey sample per pixel and write R=G=B with
//! alpha fixed at 255.

use image::RgbaImage;

use crate::{ImagingError, Result};

/// Row-major RGBA8 pixel buffer with explicit width and height.
pub type PixelBuffer = RgbaImage;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Wrap raw RGBA8 samples (as handed over by a decoder) into a [`PixelBuffer`].
pub fn pixel_buffer_from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<PixelBuffer> {
    ensure_non_empty(width, height)?;

    let expected = width as usize * height as usize * CHANNELS;
    let actual = samples.len();
    let size_error = ImagingError::BufferSize {
        width,
        height,
        expected,
        actual,
    };
    if actual != expected {
        return Err(size_error);
    }

    RgbaImage::from_raw(width, height, samples).ok_or(size_error)
}

pub(crate) fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImagingError::EmptyImage { width, height });
    }
    Ok(())
}

/// Red channel of every pixel, used as the grey value by single-sample filters.
pub(crate) fn red_plane(img: &RgbaImage) -> Vec<u8> {
    img.pixels().map(|p| p.0[0]).collect()
}

/// Rounded mean of R, G and B for every pixel.
pub(crate) fn mean_plane(img: &RgbaImage) -> Vec<u8> {
    img.pixels()
        .map(|p| {
            let sum = u16::from(p.0[0]) + u16::from(p.0[1]) + u16::from(p.0[2]);
            // sum/3 never lands on .5, so (sum + 1) / 3 is round-half-up
            ((sum + 1) / 3) as u8
        })
        .collect()
}

/// Write a grey, fully opaque pixel at column `x` of an RGBA row.
#[inline]
pub(crate) fn put_gray(row: &mut [u8], x: usize, value: u8) {
    let i = x * CHANNELS;
    row[i] = value;
    row[i + 1] = value;
    row[i + 2] = value;
    row[i + 3] = 255;
}

/// Round and clamp a floating value into the 8-bit range.
#[inline]
pub(crate) fn to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_from_raw_accepts_matching_length() {
        let img = pixel_buffer_from_raw(2, 3, vec![0; 24]).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
    }

    #[test]
    fn test_from_raw_rejects_short_buffer() {
        let err = pixel_buffer_from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ImagingError::BufferSize {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_from_raw_rejects_empty() {
        let err = pixel_buffer_from_raw(0, 5, Vec::new()).unwrap_err();
        assert!(matches!(err, ImagingError::EmptyImage { .. }));
    }

    #[test]
    fn test_mean_plane_rounds() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([1, 0, 0, 255])); // 0.33 -> 0
        img.put_pixel(1, 0, Rgba([1, 1, 0, 255])); // 0.67 -> 1
        img.put_pixel(2, 0, Rgba([255, 255, 255, 255]));
        assert_eq!(mean_plane(&img), vec![0, 1, 255]);
    }

    #[test]
    fn test_red_plane_reads_first_channel() {
        let img = RgbaImage::from_pixel(2, 1, Rgba([9, 100, 200, 7]));
        assert_eq!(red_plane(&img), vec![9, 9]);
    }

    #[test]
    fn test_to_u8_clamps() {
        assert_eq!(to_u8(-3.0), 0);
        assert_eq!(to_u8(254.6), 255);
        assert_eq!(to_u8(300.0), 255);
    }
}
