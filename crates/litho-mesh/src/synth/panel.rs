//! Flat panel: relief top surface, flat base at z = 0 and four side walls.
//!
//! Every heightmap sample becomes one top vertex, so the output is a closed
//! solid with `4(w-1)(h-1) + 4(w-1) + 4(h-1)` triangles.

use nalgebra::Point3;
use tracing::debug;

use crate::{HeightMap, MeshError, Result, Triangle, TriangleSink};

/// Exact triangle count for a `width` x `height` grid.
pub fn triangle_count(width: usize, height: usize) -> usize {
    let (cw, ch) = (width.saturating_sub(1), height.saturating_sub(1));
    4 * cw * ch + 4 * cw + 4 * ch
}

/// Grid-to-millimetre mapping of the panel.
struct PanelGrid<'a> {
    map: &'a HeightMap,
    dx: f64,
    dy: f64,
}

impl PanelGrid<'_> {
    #[inline]
    fn top(&self, x: usize, y: usize) -> Point3<f64> {
        Point3::new(x as f64 * self.dx, y as f64 * self.dy, self.map.get(x, y))
    }

    #[inline]
    fn base(&self, x: usize, y: usize) -> Point3<f64> {
        Point3::new(x as f64 * self.dx, y as f64 * self.dy, 0.0)
    }
}

/// Triangulate `map` as a `size_x` x `size_y` mm panel.
///
/// Requires at least 2 samples on each axis.
pub fn generate<S: TriangleSink>(
    map: &HeightMap,
    size_x: f64,
    size_y: f64,
    sink: &mut S,
) -> Result<usize> {
    let (w, h) = (map.width(), map.height());
    if w < 2 {
        return Err(MeshError::InvalidDimension {
            axis: "width",
            value: w,
        });
    }
    if h < 2 {
        return Err(MeshError::InvalidDimension {
            axis: "height",
            value: h,
        });
    }

    let grid = PanelGrid {
        map,
        dx: size_x / (w - 1) as f64,
        dy: size_y / (h - 1) as f64,
    };
    debug!(w, h, dx = grid.dx, dy = grid.dy, "Generating panel");

    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let (p1, p2) = (grid.top(x, y), grid.top(x + 1, y));
            let (p3, p4) = (grid.top(x, y + 1), grid.top(x + 1, y + 1));
            sink.push(Triangle::new(p1, p2, p3))?;
            sink.push(Triangle::new(p2, p4, p3))?;

            let (b1, b2) = (grid.base(x, y), grid.base(x + 1, y));
            let (b3, b4) = (grid.base(x, y + 1), grid.base(x + 1, y + 1));
            sink.push(Triangle::new(b3, b2, b1))?;
            sink.push(Triangle::new(b3, b4, b2))?;
        }
    }

    // Walls along y = 0 and x = w-1 face outward as built; the opposite two
    // are walked in the same direction and need the flipped winding.
    let walls: [(Vec<(usize, usize)>, bool); 4] = [
        ((0..w).map(|x| (x, 0)).collect(), false),
        ((0..w).map(|x| (x, h - 1)).collect(), true),
        ((0..h).map(|y| (0, y)).collect(), true),
        ((0..h).map(|y| (w - 1, y)).collect(), false),
    ];
    for (edge, flip) in &walls {
        for pair in edge.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            let (t0, t1) = (grid.top(x0, y0), grid.top(x1, y1));
            let (b0, b1) = (grid.base(x0, y0), grid.base(x1, y1));
            for triangle in [Triangle::new(t0, b0, t1), Triangle::new(t1, b0, b1)] {
                sink.push(if *flip { triangle.flipped() } else { triangle })?;
            }
        }
    }

    let count = triangle_count(w, h);
    debug!(triangles = count, "Panel generated");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;
    use crate::synth::test_support::{flat_map, ramp_map, unmatched_edges};

    fn build(map: &HeightMap, sx: f64, sy: f64) -> Mesh {
        let mut mesh = Mesh::new();
        let n = generate(map, sx, sy, &mut mesh).unwrap();
        assert_eq!(n, mesh.len());
        mesh
    }

    #[test]
    fn test_triangle_count_formula() {
        for &(w, h) in &[(2, 2), (3, 2), (5, 7), (16, 9)] {
            let mesh = build(&ramp_map(w, h), 80.0, 60.0);
            assert_eq!(mesh.len(), triangle_count(w, h), "grid {w}x{h}");
            assert_eq!(
                mesh.len(),
                4 * (w - 1) * (h - 1) + 4 * (w - 1) + 4 * (h - 1)
            );
        }
    }

    #[test]
    fn test_panel_is_closed() {
        let mesh = build(&ramp_map(6, 4), 50.0, 30.0);
        assert_eq!(unmatched_edges(&mesh), 0);
    }

    #[test]
    fn test_panel_faces_outward() {
        let mesh = build(&flat_map(4, 3, 2.0), 30.0, 20.0);
        // Flat 30 x 20 x 2 slab
        assert!((mesh.signed_volume() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_walls_face_away_from_centre() {
        let mesh = build(&ramp_map(5, 5), 40.0, 40.0);
        let centre = Point3::new(20.0, 20.0, 0.0);
        for t in &mesh.triangles {
            let n = t.normal();
            if n.z.abs() < 1e-9 {
                let out = t.centroid() - centre;
                assert!(n.dot(&out) > 0.0, "inward wall {t:?}");
            }
        }
    }

    #[test]
    fn test_top_and_base_orientation() {
        let mesh = build(&flat_map(3, 3, 1.0), 10.0, 10.0);
        let up = mesh.triangles.iter().filter(|t| t.normal().z > 0.5).count();
        let down = mesh.triangles.iter().filter(|t| t.normal().z < -0.5).count();
        assert_eq!(up, 8);
        assert_eq!(down, 8);
    }

    #[test]
    fn test_panel_spans_physical_size() {
        let mesh = build(&ramp_map(4, 3), 80.0, 60.0);
        let max_x = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices)
            .map(|p| p.x)
            .fold(f64::MIN, f64::max);
        let max_y = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices)
            .map(|p| p.y)
            .fold(f64::MIN, f64::max);
        assert!((max_x - 80.0).abs() < 1e-9);
        assert!((max_y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_small_grid_is_invalid() {
        let mut mesh = Mesh::new();
        let err = generate(&ramp_map(1, 5), 10.0, 10.0, &mut mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidDimension {
                axis: "width",
                value: 1
            }
        ));
        let err = generate(&ramp_map(5, 1), 10.0, 10.0, &mut mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidDimension {
                axis: "height",
                value: 1
            }
        ));
        assert!(mesh.is_empty());
    }
}
