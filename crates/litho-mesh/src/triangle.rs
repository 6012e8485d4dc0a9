//! Triangle soup types.

use nalgebra::{Point3, Vector3};

use crate::Result;

/// Cross products shorter than this are treated as degenerate.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Three vertices in counter-clockwise order seen from the outside.
///
/// The facet normal is always derived from the winding, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Same triangle with the opposite winding.
    #[inline]
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a, c, b)
    }

    /// Unit normal of `(v2 - v1) x (v3 - v1)`, or the zero vector when the
    /// triangle is degenerate.
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c] = self.vertices;
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len < DEGENERATE_EPSILON {
            return Vector3::zeros();
        }
        n / len
    }

    /// Signed volume contribution against the origin (divergence theorem).
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c] = self.vertices;
        a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
    }

    pub fn centroid(&self) -> Point3<f64> {
        let [a, b, c] = self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}

/// Consumer of generated triangles.
///
/// Synthesizers push triangles one by one, so a sink can stream them straight
/// to a writer or collect them into a [`Mesh`].
pub trait TriangleSink {
    fn push(&mut self, triangle: Triangle) -> Result<()>;
}

/// Ordered sequence of triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Enclosed volume; positive when the triangles face outward.
    pub fn signed_volume(&self) -> f64 {
        self.triangles.iter().map(Triangle::signed_volume).sum()
    }
}

impl TriangleSink for Mesh {
    fn push(&mut self, triangle: Triangle) -> Result<()> {
        self.triangles.push(triangle);
        Ok(())
    }
}
