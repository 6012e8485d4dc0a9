//! Spherical shell with the heightmap wrapped equirectangularly.
//!
//! Longitude follows the image x axis and latitude the y axis. Thickness
//! pushes the surface outward from the nominal radius, centred on the middle
//! of the thickness range so the average radius stays at `diameter / 2`.

use std::f64::consts::PI;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

use super::clamp_segments;
use crate::{HeightMap, Interpolation, Result, Triangle, TriangleSink};

/// Segment count for a heightmap, shared by latitude and longitude.
pub fn segments_for(map: &HeightMap) -> usize {
    let longest = map.width().max(map.height()) as f64;
    clamp_segments((longest * 1.2).floor() as usize)
}

/// Exact triangle count for `segments`.
pub fn triangle_count(segments: usize) -> usize {
    let quads = segments.saturating_sub(1);
    2 * quads * quads
}

/// Surface points, row-major by latitude.
fn surface_points(
    map: &HeightMap,
    diameter_mm: f64,
    interpolation: Interpolation,
    segments: usize,
) -> Vec<Point3<f64>> {
    let base_radius = diameter_mm / 2.0;
    let mid = map.range().mid_mm();
    let step = segments as f64;

    (0..segments * segments)
        .into_par_iter()
        .map(|i| {
            let (lat, lon) = (i / segments, i % segments);
            let (u, v) = (lon as f64 / step, lat as f64 / step);
            let thickness = interpolation.sample(map, u, v);
            let r = base_radius + thickness - mid;

            let theta = lon as f64 * 2.0 * PI / step;
            let phi = lat as f64 * PI / step;
            Point3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            )
        })
        .collect()
}

/// Triangulate `map` onto a sphere of `diameter_mm`.
pub fn generate<S: TriangleSink>(
    map: &HeightMap,
    diameter_mm: f64,
    interpolation: Interpolation,
    sink: &mut S,
) -> Result<usize> {
    let segments = segments_for(map);
    debug!(segments, diameter_mm, "Generating sphere");

    let points = surface_points(map, diameter_mm, interpolation, segments);
    let at = |lat: usize, lon: usize| points[lat * segments + lon];

    let mut count = 0;
    for lat in 0..segments - 1 {
        for lon in 0..segments - 1 {
            let (p1, p2) = (at(lat, lon), at(lat, lon + 1));
            let (p3, p4) = (at(lat + 1, lon), at(lat + 1, lon + 1));
            sink.push(Triangle::new(p1, p3, p2))?;
            sink.push(Triangle::new(p2, p3, p4))?;
            count += 2;
        }
    }

    debug!(triangles = count, "Sphere generated");
    Ok(count)
}
