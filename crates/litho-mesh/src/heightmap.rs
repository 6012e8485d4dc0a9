//! Luminance to thickness mapping.
//!
//! Brighter pixels become thinner: `thickness = min + (1 - luma^gamma) * (max - min)`.
//! This gamma reshapes the thickness curve and is applied after any gamma
//! step of the preprocessing profile.

use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{MeshError, Result};

/// Thickness bounds (mm) and the thickness-curve gamma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThicknessRange {
    pub min_mm: f64,
    pub max_mm: f64,
    pub gamma: f64,
}

impl ThicknessRange {
    /// Validated constructor.
    pub fn new(min_mm: f64, max_mm: f64, gamma: f64) -> Result<Self> {
        let range = Self {
            min_mm,
            max_mm,
            gamma,
        };
        range.validate()?;
        Ok(range)
    }

    /// Check `0 < min <= max` and `gamma > 0`, all finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_mm.is_finite() && self.max_mm.is_finite() && self.gamma.is_finite()) {
            return Err(MeshError::InvalidRange(format!(
                "thickness and gamma must be finite (min={}, max={}, gamma={})",
                self.min_mm, self.max_mm, self.gamma
            )));
        }
        if self.min_mm <= 0.0 {
            return Err(MeshError::InvalidRange(format!(
                "min thickness must be positive, got {}",
                self.min_mm
            )));
        }
        if self.max_mm < self.min_mm {
            return Err(MeshError::InvalidRange(format!(
                "max thickness {} is below min thickness {}",
                self.max_mm, self.min_mm
            )));
        }
        if self.gamma <= 0.0 {
            return Err(MeshError::InvalidRange(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Thickness midpoint, the value placed on the nominal radius of curved shapes.
    pub fn mid_mm(&self) -> f64 {
        (self.min_mm + self.max_mm) / 2.0
    }

    /// Thickness for a normalized luminance in `[0, 1]`.
    pub fn thickness_for(&self, luminance: f64) -> f64 {
        let adjusted = luminance.clamp(0.0, 1.0).powf(self.gamma);
        let t = self.min_mm + (1.0 - adjusted) * (self.max_mm - self.min_mm);
        t.clamp(self.min_mm, self.max_mm)
    }
}

/// Immutable grid of thickness values, row-major with an explicit stride.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    width: usize,
    height: usize,
    range: ThicknessRange,
    values: Vec<f64>,
}

impl HeightMap {
    /// Build from raw values; every value is clamped into the range.
    pub fn from_values(
        width: usize,
        height: usize,
        range: ThicknessRange,
        values: Vec<f64>,
    ) -> Result<Self> {
        range.validate()?;
        if width == 0 {
            return Err(MeshError::InvalidDimension {
                axis: "width",
                value: width,
            });
        }
        if height == 0 {
            return Err(MeshError::InvalidDimension {
                axis: "height",
                value: height,
            });
        }
        if values.len() != width * height {
            return Err(MeshError::InvalidRange(format!(
                "expected {} values for {width}x{height}, got {}",
                width * height,
                values.len()
            )));
        }
        let values = values
            .into_iter()
            .map(|v| v.clamp(range.min_mm, range.max_mm))
            .collect();
        Ok(Self {
            width,
            height,
            range,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn range(&self) -> &ThicknessRange {
        &self.range
    }

    /// Thickness at grid position `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Thickness at a possibly out-of-range position, clamped to the border.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let xx = x.clamp(0, self.width as isize - 1) as usize;
        let yy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(xx, yy)
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Perceptual luminance of an RGBA pixel, normalized to `[0, 1]`.
#[inline]
pub fn luminance(px: &[u8]) -> f64 {
    (0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2])) / 255.0
}

/// Build the thickness field of a preprocessed image.
pub fn build_heightmap(img: &RgbaImage, range: &ThicknessRange) -> Result<HeightMap> {
    range.validate()?;
    let (width, height) = img.dimensions();
    debug!(
        width,
        height,
        min_mm = range.min_mm,
        max_mm = range.max_mm,
        gamma = range.gamma,
        "Building heightmap"
    );

    let samples: &[u8] = img;
    let values: Vec<f64> = samples
        .par_chunks(4)
        .map(|px| range.thickness_for(luminance(px)))
        .collect();

    HeightMap::from_values(width as usize, height as usize, *range, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn range() -> ThicknessRange {
        ThicknessRange::new(0.8, 3.0, 1.2).unwrap()
    }

    #[test]
    fn test_black_is_thickest_white_is_thinnest() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let hm = build_heightmap(&img, &range()).unwrap();
        assert!((hm.get(0, 0) - 3.0).abs() < 1e-12);
        assert!((hm.get(1, 0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_thickness_non_increasing_in_luminance() {
        let mut img = RgbaImage::new(256, 1);
        for x in 0..256u32 {
            let v = x as u8;
            img.put_pixel(x, 0, Rgba([v, v, v, 255]));
        }
        let hm = build_heightmap(&img, &range()).unwrap();
        for x in 1..256 {
            assert!(hm.get(x, 0) <= hm.get(x - 1, 0));
        }
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut img = RgbaImage::new(16, 16);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255]);
        }
        for gamma in [0.3, 1.0, 2.5] {
            let r = ThicknessRange::new(0.6, 2.4, gamma).unwrap();
            let hm = build_heightmap(&img, &r).unwrap();
            assert!(hm.values().iter().all(|&t| (0.6..=2.4).contains(&t)));
        }
    }

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(&[255, 0, 0, 255]) - 0.299).abs() < 1e-12);
        assert!((luminance(&[0, 255, 0, 255]) - 0.587).abs() < 1e-12);
        assert!((luminance(&[0, 0, 255, 255]) - 0.114).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_reshapes_midtones() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
        let soft = build_heightmap(&img, &ThicknessRange::new(1.0, 2.0, 0.5).unwrap()).unwrap();
        let hard = build_heightmap(&img, &ThicknessRange::new(1.0, 2.0, 2.0).unwrap()).unwrap();
        // luma^2 < luma^0.5 for luma < 1, so higher gamma gives a thicker midtone
        assert!(hard.get(0, 0) > soft.get(0, 0));
    }

    #[test]
    fn test_equal_bounds_give_flat_map() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([10, 200, 90, 255]));
        let hm = build_heightmap(&img, &ThicknessRange::new(1.5, 1.5, 1.0).unwrap()).unwrap();
        assert!(hm.values().iter().all(|&t| t == 1.5));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        assert!(matches!(
            ThicknessRange::new(3.0, 0.8, 1.0),
            Err(MeshError::InvalidRange(_))
        ));
        assert!(ThicknessRange::new(0.8, 3.0, 0.0).is_err());
        assert!(ThicknessRange::new(0.8, 3.0, -1.0).is_err());
        assert!(ThicknessRange::new(0.0, 3.0, 1.0).is_err());
        assert!(ThicknessRange::new(0.8, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(HeightMap::from_values(2, 2, range(), vec![1.0; 3]).is_err());
        assert!(HeightMap::from_values(0, 2, range(), Vec::new()).is_err());
    }

    #[test]
    fn test_get_clamped_never_leaves_grid() {
        let hm = HeightMap::from_values(2, 2, range(), vec![1.0, 2.0, 2.5, 3.0]).unwrap();
        assert_eq!(hm.get_clamped(-5, -5), 1.0);
        assert_eq!(hm.get_clamped(9, 0), 2.0);
        assert_eq!(hm.get_clamped(0, 9), 2.5);
        assert_eq!(hm.get_clamped(9, 9), 3.0);
    }
}
