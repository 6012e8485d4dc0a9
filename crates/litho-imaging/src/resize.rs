//! Resampling to the working resolution.
//!
//! Uses Lanczos3 filtering; the aspect ratio is decided beforehand by
//! [`ResolutionPolicy`](crate::ResolutionPolicy).

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::resolution::WorkingResolution;

/// Resample `img` to the resolved working size.
///
/// Returns a copy unchanged if the image already has that size.
pub fn resize_to_working(img: &RgbaImage, target: &WorkingResolution) -> RgbaImage {
    let (orig_w, orig_h) = img.dimensions();

    if (orig_w, orig_h) == (target.width, target.height) {
        debug!(
            width = orig_w,
            height = orig_h,
            "Image already at working size, skipping resize"
        );
        return img.clone();
    }

    debug!(
        orig_w,
        orig_h,
        new_width = target.width,
        new_height = target.height,
        "Resizing image to working resolution"
    );

    imageops::resize(img, target.width, target.height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolutionPolicy;
    use image::Rgba;

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn test_resize_upscales_small_source() {
        let img = create_test_image(200, 100);
        let target = ResolutionPolicy::default().resolve(200, 100).unwrap();
        let result = resize_to_working(&img, &target);
        assert_eq!(result.dimensions(), (400, 200));
    }

    #[test]
    fn test_resize_downscales_large_source() {
        let img = create_test_image(1600, 900);
        let target = ResolutionPolicy::default().resolve(1600, 900).unwrap();
        let result = resize_to_working(&img, &target);
        assert_eq!(result.dimensions(), (1200, 675));
    }

    #[test]
    fn test_resize_same_size_is_copy() {
        let img = create_test_image(400, 300);
        let target = WorkingResolution {
            width: 400,
            height: 300,
            warning: None,
        };
        let result = resize_to_working(&img, &target);
        assert_eq!(result, img);
    }
}
