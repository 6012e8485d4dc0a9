//! Open cylindrical shell around the y axis.
//!
//! The image wraps once around the circumference (x) and runs up the height
//! (y). Thickness grows inward: brighter, thinner regions bulge out toward the
//! nominal radius while dark regions thicken the wall toward the axis.

use std::f64::consts::PI;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

use super::clamp_segments;
use crate::{HeightMap, Interpolation, Result, Triangle, TriangleSink};

/// `(segments, rings)` for a heightmap: circumference from width, rings from height.
pub fn resolution_for(map: &HeightMap) -> (usize, usize) {
    (clamp_segments(map.width()), clamp_segments(map.height()))
}

/// Exact triangle count for the given resolution.
pub fn triangle_count(segments: usize, rings: usize) -> usize {
    2 * segments.saturating_sub(1) * rings.saturating_sub(1)
}

/// Triangulate `map` onto a cylinder of `diameter_mm` x `height_mm`.
pub fn generate<S: TriangleSink>(
    map: &HeightMap,
    diameter_mm: f64,
    height_mm: f64,
    interpolation: Interpolation,
    sink: &mut S,
) -> Result<usize> {
    let (segments, rings) = resolution_for(map);
    debug!(segments, rings, diameter_mm, height_mm, "Generating cylinder");

    let base_radius = diameter_mm / 2.0;
    let mid = map.range().mid_mm();
    let (seg_step, ring_step) = (segments as f64, rings as f64);

    let points: Vec<Point3<f64>> = (0..rings * segments)
        .into_par_iter()
        .map(|i| {
            let (ring, seg) = (i / segments, i % segments);
            let (u, v) = (seg as f64 / seg_step, ring as f64 / ring_step);
            let thickness = interpolation.sample(map, u, v);
            let r = base_radius - thickness + mid;

            let theta = seg as f64 * 2.0 * PI / seg_step;
            let y = v * height_mm;
            Point3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect();
    let at = |ring: usize, seg: usize| points[ring * segments + seg];

    let mut count = 0;
    for ring in 0..rings - 1 {
        for seg in 0..segments - 1 {
            let (p1, p2) = (at(ring, seg), at(ring, seg + 1));
            let (p3, p4) = (at(ring + 1, seg), at(ring + 1, seg + 1));
            sink.push(Triangle::new(p1, p3, p2))?;
            sink.push(Triangle::new(p2, p3, p4))?;
            count += 2;
        }
    }

    debug!(triangles = count, "Cylinder generated");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;
    use crate::synth::test_support::{duplicated_edges, flat_map, ramp_map, unmatched_edges};
    use crate::synth::{MAX_SEGMENTS, MIN_SEGMENTS};

    #[test]
    fn test_resolution_clamps_each_axis() {
        assert_eq!(resolution_for(&ramp_map(10, 10)), (MIN_SEGMENTS, MIN_SEGMENTS));
        assert_eq!(resolution_for(&ramp_map(200, 600)), (200, MAX_SEGMENTS));
    }

    #[test]
    fn test_triangle_count() {
        let map = ramp_map(180, 12);
        let mut mesh = Mesh::new();
        let n = generate(&map, 80.0, 100.0, Interpolation::Bicubic, &mut mesh).unwrap();
        assert_eq!(n, triangle_count(180, MIN_SEGMENTS));
        assert_eq!(mesh.len(), 2 * 179 * 149);
    }

    #[test]
    fn test_flat_map_geometry() {
        let mut mesh = Mesh::new();
        generate(&flat_map(5, 5, 1.9), 80.0, 120.0, Interpolation::Bilinear, &mut mesh).unwrap();
        let mut max_y: f64 = 0.0;
        for t in &mesh.triangles {
            for p in &t.vertices {
                let radial = (p.x * p.x + p.z * p.z).sqrt();
                assert!((radial - 40.0).abs() < 1e-9);
                assert!(p.y >= 0.0);
                max_y = max_y.max(p.y);
            }
        }
        // Top ring sits one ring step below the full height
        assert!((max_y - 149.0 / 150.0 * 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_thicker_means_smaller_radius() {
        let mut thin = Mesh::new();
        let mut thick = Mesh::new();
        generate(&flat_map(4, 4, 0.8), 50.0, 30.0, Interpolation::Bicubic, &mut thin).unwrap();
        generate(&flat_map(4, 4, 3.0), 50.0, 30.0, Interpolation::Bicubic, &mut thick).unwrap();
        let radial = |m: &Mesh| {
            let p = m.triangles[0].vertices[0];
            (p.x * p.x + p.z * p.z).sqrt()
        };
        assert!((radial(&thin) - radial(&thick) - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_normals_point_away_from_axis() {
        let mut mesh = Mesh::new();
        generate(&ramp_map(6, 6), 70.0, 40.0, Interpolation::Bilinear, &mut mesh).unwrap();
        for t in &mesh.triangles {
            let c = t.centroid();
            let n = t.normal();
            assert!(n.x * c.x + n.z * c.z > 0.0);
        }
    }

    #[test]
    fn test_tube_edges_are_shared_once() {
        for (map, interpolation) in [
            (ramp_map(6, 6), Interpolation::Bicubic),
            (ramp_map(180, 6), Interpolation::Bilinear),
        ] {
            let mut mesh = Mesh::new();
            generate(&map, 70.0, 40.0, interpolation, &mut mesh).unwrap();
            let (s, r) = resolution_for(&map);
            assert_eq!(duplicated_edges(&mesh), 0);
            // Open along the seam and at both ends
            assert_eq!(unmatched_edges(&mesh), 2 * (s - 1) + 2 * (r - 1));
        }
    }
}
