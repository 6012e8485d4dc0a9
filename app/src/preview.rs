//! Backlit preview of a heightmap: thin regions glow, thick regions stay dark.

use image::{GrayImage, Luma};
use litho_mesh::HeightMap;
use tracing::debug;

/// Smallest thickness span used for normalization.
const MIN_SPAN_MM: f64 = 1e-4;

/// Render `map` as a greyscale image, `brightness = 1 - (t - min) / (max - min)`.
pub fn render_preview(map: &HeightMap, min_mm: f64, max_mm: f64) -> GrayImage {
    let span = (max_mm - min_mm).max(MIN_SPAN_MM);
    let (width, height) = (map.width() as u32, map.height() as u32);
    debug!(width, height, min_mm, max_mm, "Rendering preview");

    GrayImage::from_fn(width, height, |x, y| {
        let t = map.get(x as usize, y as usize);
        let brightness = 1.0 - (t - min_mm) / span;
        Luma([(brightness * 255.0).round().clamp(0.0, 255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use litho_mesh::ThicknessRange;

    use super::*;

    fn map(values: Vec<f64>, width: usize) -> HeightMap {
        let range = ThicknessRange::new(1.0, 3.0, 1.0).unwrap();
        let height = values.len() / width;
        HeightMap::from_values(width, height, range, values).unwrap()
    }

    #[test]
    fn test_thin_is_bright_thick_is_dark() {
        let img = render_preview(&map(vec![1.0, 2.0, 3.0], 3), 1.0, 3.0);
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(1, 0).0, [128]);
        assert_eq!(img.get_pixel(2, 0).0, [0]);
    }

    #[test]
    fn test_degenerate_span_does_not_divide_by_zero() {
        let img = render_preview(&map(vec![2.0; 4], 2), 2.0, 2.0);
        assert!(img.pixels().all(|p| p.0 == [255]));
    }

    #[test]
    fn test_preview_matches_map_size() {
        let img = render_preview(&map(vec![1.0; 12], 4), 1.0, 3.0);
        assert_eq!(img.dimensions(), (4, 3));
    }
}
