//! ASCII STL serialization.
//!
//! ```text
//! solid <name>
//!   facet normal nx ny nz
//!     outer loop
//!       vertex x y z
//!       vertex x y z
//!       vertex x y z
//!     endloop
//!   endfacet
//! endsolid <name>
//! ```
//!
//! All numbers use fixed 6-decimal formatting. Nothing beyond the current
//! triangle is buffered.

use std::io::Write;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::{Mesh, Result, Triangle, TriangleSink};

/// Streaming ASCII STL writer.
///
/// Writes the `solid` header on creation; call [`StlWriter::finish`] to write
/// the `endsolid` footer and get the inner writer back.
pub struct StlWriter<W: Write> {
    writer: W,
    name: String,
    facets: usize,
}

impl<W: Write> StlWriter<W> {
    pub fn new(mut writer: W, name: &str) -> Result<Self> {
        writeln!(writer, "solid {name}")?;
        Ok(Self {
            writer,
            name: name.to_string(),
            facets: 0,
        })
    }

    /// Number of facets written so far.
    pub fn facet_count(&self) -> usize {
        self.facets
    }

    /// Write one facet record.
    pub fn write_triangle(&mut self, triangle: &Triangle) -> Result<()> {
        let w = &mut self.writer;
        let n = triangle.normal();
        writeln!(w, "  facet normal {}", format_vector(&n))?;
        writeln!(w, "    outer loop")?;
        for v in &triangle.vertices {
            writeln!(w, "      vertex {}", format_point(v))?;
        }
        writeln!(w, "    endloop")?;
        writeln!(w, "  endfacet")?;
        self.facets += 1;
        Ok(())
    }

    /// Write the footer and flush.
    pub fn finish(mut self) -> Result<W> {
        writeln!(self.writer, "endsolid {}", self.name)?;
        self.writer.flush()?;
        debug!(name = %self.name, facets = self.facets, "Finished STL solid");
        Ok(self.writer)
    }
}

impl<W: Write> TriangleSink for StlWriter<W> {
    fn push(&mut self, triangle: Triangle) -> Result<()> {
        self.write_triangle(&triangle)
    }
}

/// Serialize a collected mesh as one named solid.
pub fn write_ascii_stl<W: Write>(mesh: &Mesh, name: &str, writer: W) -> Result<W> {
    let mut stl = StlWriter::new(writer, name)?;
    for triangle in &mesh.triangles {
        stl.write_triangle(triangle)?;
    }
    stl.finish()
}

fn format_vector(v: &Vector3<f64>) -> String {
    format!("{:.6} {:.6} {:.6}", fixed(v.x), fixed(v.y), fixed(v.z))
}

fn format_point(p: &Point3<f64>) -> String {
    format_vector(&p.coords)
}

/// Avoid printing `-0.000000` for a negative zero.
#[inline]
fn fixed(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}
