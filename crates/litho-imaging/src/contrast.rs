//! Local contrast enhancement (contrast-limited adaptive histogram equalization).
//!
//! The image is split into non-overlapping square tiles. Each tile gets a
//! clipped 256-bin histogram whose cumulative distribution is normalized to
//! `[0, 255]`; every pixel is then remapped by a bilinear blend of the four
//! nearest tile mappings, weighted by the pixel's position between tile
//! centres.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{CHANNELS, ensure_non_empty, mean_plane, put_gray, to_u8};
use crate::{ImagingError, Result};

/// Default clip limit, in histogram counts per bin.
pub const DEFAULT_CLIP_LIMIT: f64 = 2.0;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 8;

const BINS: usize = 256;

/// Normalized cumulative mapping of one tile.
type TileMapping = [f64; BINS];

/// Apply contrast-limited adaptive histogram equalization.
///
/// `clip_limit` caps each histogram bin (in pixel counts) before the excess
/// is spread evenly over all 256 bins; pass `f64::INFINITY` to disable
/// clipping. With a single tile covering the whole image and no clipping
/// this is plain global histogram equalization.
pub fn equalize_local(img: &RgbaImage, clip_limit: f64, tile_size: u32) -> Result<RgbaImage> {
    if tile_size == 0 {
        return Err(ImagingError::InvalidParameter(
            "tile size must be at least 1".into(),
        ));
    }
    if clip_limit.is_nan() || clip_limit <= 0.0 {
        return Err(ImagingError::InvalidParameter(format!(
            "clip limit must be positive, got {clip_limit}"
        )));
    }
    let (width, height) = img.dimensions();
    ensure_non_empty(width, height)?;

    let w = width as usize;
    let h = height as usize;
    let tile = tile_size as usize;
    let tiles_x = w.div_ceil(tile);
    let tiles_y = h.div_ceil(tile);
    debug!(
        width,
        height, tile_size, tiles_x, tiles_y, clip_limit, "Applying local contrast equalization"
    );

    let gray = mean_plane(img);

    let mappings: Vec<TileMapping> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let x_range = tx * tile..((tx + 1) * tile).min(w);
            let y_range = ty * tile..((ty + 1) * tile).min(h);
            let mut hist = [0.0f64; BINS];
            for y in y_range {
                for &v in &gray[y * w + x_range.start..y * w + x_range.end] {
                    hist[v as usize] += 1.0;
                }
            }
            tile_mapping(hist, clip_limit)
        })
        .collect();

    let mut out = RgbaImage::new(width, height);
    let samples: &mut [u8] = &mut out;
    samples
        .par_chunks_mut(w * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let (ty0, ty1, fy) = blend_position(y, tile, tiles_y);
            for x in 0..w {
                let (tx0, tx1, fx) = blend_position(x, tile, tiles_x);
                let bin = gray[y * w + x] as usize;

                let v00 = mappings[ty0 * tiles_x + tx0][bin];
                let v10 = mappings[ty0 * tiles_x + tx1][bin];
                let v01 = mappings[ty1 * tiles_x + tx0][bin];
                let v11 = mappings[ty1 * tiles_x + tx1][bin];

                let value = v00 * (1.0 - fx) * (1.0 - fy)
                    + v10 * fx * (1.0 - fy)
                    + v01 * (1.0 - fx) * fy
                    + v11 * fx * fy;
                put_gray(row, x, to_u8(value));
            }
        });

    Ok(out)
}

/// Clip, redistribute, accumulate and normalize one tile histogram.
fn tile_mapping(mut hist: [f64; BINS], clip_limit: f64) -> TileMapping {
    let mut excess = 0.0;
    for bin in hist.iter_mut() {
        if *bin > clip_limit {
            excess += *bin - clip_limit;
            *bin = clip_limit;
        }
    }
    let redistribute = excess / BINS as f64;

    let mut cdf = [0.0f64; BINS];
    let mut running = 0.0;
    for (c, &count) in cdf.iter_mut().zip(hist.iter()) {
        running += count + redistribute;
        *c = running;
    }

    let cdf_min = cdf.iter().copied().find(|&v| v > 0.0).unwrap_or(0.0);
    let cdf_max = cdf[BINS - 1];
    // Uniform tile: min == max, divide by 1 instead
    let range = if cdf_max - cdf_min == 0.0 {
        1.0
    } else {
        cdf_max - cdf_min
    };

    cdf.map(|v| (v - cdf_min) / range * 255.0)
}

/// Neighbouring tile indices and blend weight for a pixel coordinate.
///
/// The position is measured in tile units from the first tile centre and
/// clamped to the valid tile range, so border pixels use the edge tile.
fn blend_position(coord: usize, tile: usize, tiles: usize) -> (usize, usize, f64) {
    let max_index = (tiles - 1) as f64;
    let pos = ((coord as f64 + 0.5) / tile as f64 - 0.5).clamp(0.0, max_index);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(tiles - 1);
    (i0, i1, pos - i0 as f64)
}
