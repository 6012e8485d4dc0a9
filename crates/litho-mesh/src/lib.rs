//! Lithophane surface generation.
//!
//! Turns a preprocessed image into a thickness field ([`HeightMap`]),
//! reconstructs it continuously ([`Interpolation`]), triangulates it as a
//! flat panel, a spherical shell or a cylindrical shell, and streams the
//! triangles out as ASCII STL.

pub mod heightmap;
pub mod sampler;
pub mod stl;
pub mod synth;
pub mod triangle;

// Re-exports for convenience
pub use heightmap::{HeightMap, ThicknessRange, build_heightmap};
pub use sampler::Interpolation;
pub use stl::{StlWriter, write_ascii_stl};
pub use synth::{Shape, synthesize};
pub use triangle::{Mesh, Triangle, TriangleSink};

/// Errors that can occur while building or writing a mesh.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Grid {axis} must be at least 2 samples, got {value}")]
    InvalidDimension { axis: &'static str, value: usize },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Unknown topology '{0}' (expected panel, frame, sphere, bauble, cylinder or cone)")]
    UnknownShape(String),

    #[error("Mesh write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
