//! Continuous reconstruction of a [`HeightMap`] at sub-pixel positions.
//!
//! `(u, v)` in `[0, 1]^2` maps onto grid coordinates `(u * (w - 1), v * (h - 1))`.
//! Neighbour indices clamp to the grid border; nothing wraps.

use serde::{Deserialize, Serialize};

use crate::HeightMap;

/// Interpolation used when sampling the heightmap for curved shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Bicubic,
    Bilinear,
}

impl Interpolation {
    pub fn sample(self, map: &HeightMap, u: f64, v: f64) -> f64 {
        match self {
            Interpolation::Bicubic => sample_bicubic(map, u, v),
            Interpolation::Bilinear => sample_bilinear(map, u, v),
        }
    }
}

/// Catmull-Rom style cubic through `p1..p2`, with `p0`/`p3` as outer support.
#[inline]
pub fn cubic_interpolate(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    p1 + 0.5
        * t
        * (p2 - p0 + t * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3 + t * (3.0 * (p1 - p2) + p3 - p0)))
}

/// Grid cell and fractional offset along one axis.
#[inline]
fn locate(coord: f64, len: usize) -> (isize, f64) {
    let pos = coord * (len - 1) as f64;
    let base = pos.floor();
    (base as isize, pos - base)
}

/// Bicubic sample over the clamped 4x4 neighbourhood.
///
/// Rows are interpolated first, then the four row results. The result may
/// overshoot the heightmap range near sharp edges.
pub fn sample_bicubic(map: &HeightMap, u: f64, v: f64) -> f64 {
    let (xi, fx) = locate(u, map.width());
    let (yi, fy) = locate(v, map.height());

    let mut rows = [0.0; 4];
    for (j, row) in rows.iter_mut().enumerate() {
        let y = yi + j as isize - 1;
        let p: [f64; 4] = std::array::from_fn(|i| map.get_clamped(xi + i as isize - 1, y));
        *row = cubic_interpolate(p[0], p[1], p[2], p[3], fx);
    }
    cubic_interpolate(rows[0], rows[1], rows[2], rows[3], fy)
}

/// Bilinear sample of the four surrounding grid values.
pub fn sample_bilinear(map: &HeightMap, u: f64, v: f64) -> f64 {
    let (xi, fx) = locate(u, map.width());
    let (yi, fy) = locate(v, map.height());

    let v00 = map.get_clamped(xi, yi);
    let v10 = map.get_clamped(xi + 1, yi);
    let v01 = map.get_clamped(xi, yi + 1);
    let v11 = map.get_clamped(xi + 1, yi + 1);

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}
