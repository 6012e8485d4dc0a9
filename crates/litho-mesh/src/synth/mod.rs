//! Triangulation strategies.
//!
//! Each strategy is stateless and pushes triangles straight into a
//! [`TriangleSink`]:
//! - [`panel`]: closed flat slab with relief on top
//! - [`sphere`]: spherical shell, open along the last longitude seam and at the poles
//! - [`cylinder`]: open tube, also used for the cone shape

pub mod cylinder;
pub mod panel;
pub mod sphere;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{HeightMap, Interpolation, MeshError, Result, TriangleSink};

/// Smallest segment/ring count for curved shapes.
pub const MIN_SEGMENTS: usize = 150;

/// Largest segment/ring count for curved shapes.
pub const MAX_SEGMENTS: usize = 250;

/// Topology and physical size (mm) of the printed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topology", rename_all = "lowercase")]
pub enum Shape {
    /// Flat framed panel.
    #[serde(alias = "frame")]
    Panel { width_mm: f64, height_mm: f64 },
    /// Spherical bauble.
    #[serde(alias = "bauble")]
    Sphere { diameter_mm: f64 },
    /// Cylindrical lamp shade.
    Cylinder { diameter_mm: f64, height_mm: f64 },
    /// Cone lamp shade, currently built with the cylinder geometry.
    Cone { diameter_mm: f64, height_mm: f64 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Panel {
            width_mm: 80.0,
            height_mm: 80.0,
        }
    }
}

impl Shape {
    /// Short topology name, also used in output file names.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Panel { .. } => "panel",
            Shape::Sphere { .. } => "sphere",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Cone { .. } => "cone",
        }
    }

    /// Name written in the STL `solid` envelope.
    pub fn solid_name(&self) -> &'static str {
        match self {
            Shape::Panel { .. } => "lithophane",
            Shape::Sphere { .. } => "lithophane_sphere",
            Shape::Cylinder { .. } | Shape::Cone { .. } => "lithophane_cylinder",
        }
    }

    /// Check that every dimension is positive and finite.
    pub fn validate(&self) -> Result<()> {
        let dims: Vec<(&str, f64)> = match self {
            Shape::Panel {
                width_mm,
                height_mm,
            } => vec![("width", *width_mm), ("height", *height_mm)],
            Shape::Sphere { diameter_mm } => vec![("diameter", *diameter_mm)],
            Shape::Cylinder {
                diameter_mm,
                height_mm,
            }
            | Shape::Cone {
                diameter_mm,
                height_mm,
            } => vec![("diameter", *diameter_mm), ("height", *height_mm)],
        };
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeshError::InvalidRange(format!(
                    "{} {name} must be positive, got {value}",
                    self.kind()
                )));
            }
        }
        Ok(())
    }
}

/// Topology name with default 80 mm dimensions.
impl FromStr for Shape {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self> {
        const SIZE: f64 = 80.0;
        match s.trim().to_ascii_lowercase().as_str() {
            "panel" | "frame" => Ok(Shape::Panel {
                width_mm: SIZE,
                height_mm: SIZE,
            }),
            "sphere" | "bauble" => Ok(Shape::Sphere { diameter_mm: SIZE }),
            "cylinder" => Ok(Shape::Cylinder {
                diameter_mm: SIZE,
                height_mm: SIZE,
            }),
            "cone" => Ok(Shape::Cone {
                diameter_mm: SIZE,
                height_mm: SIZE,
            }),
            _ => Err(MeshError::UnknownShape(s.to_string())),
        }
    }
}

impl Shape {
    /// Replace the dimensions that apply to this topology, ignoring the rest.
    ///
    /// Panels take `width` and `height`, spheres `diameter`, cylinders and
    /// cones `diameter` and `height`.
    pub fn with_dimensions(
        self,
        width: Option<f64>,
        height: Option<f64>,
        diameter: Option<f64>,
    ) -> Self {
        match self {
            Shape::Panel {
                width_mm,
                height_mm,
            } => Shape::Panel {
                width_mm: width.unwrap_or(width_mm),
                height_mm: height.unwrap_or(height_mm),
            },
            Shape::Sphere { diameter_mm } => Shape::Sphere {
                diameter_mm: diameter.unwrap_or(diameter_mm),
            },
            Shape::Cylinder {
                diameter_mm,
                height_mm,
            } => Shape::Cylinder {
                diameter_mm: diameter.unwrap_or(diameter_mm),
                height_mm: height.unwrap_or(height_mm),
            },
            Shape::Cone {
                diameter_mm,
                height_mm,
            } => Shape::Cone {
                diameter_mm: diameter.unwrap_or(diameter_mm),
                height_mm: height.unwrap_or(height_mm),
            },
        }
    }
}

/// Clamp a resolution-derived count into `[MIN_SEGMENTS, MAX_SEGMENTS]`.
#[inline]
pub fn clamp_segments(n: usize) -> usize {
    n.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Triangulate `map` as `shape` into `sink`, returning the triangle count.
pub fn synthesize<S: TriangleSink>(
    map: &HeightMap,
    shape: &Shape,
    interpolation: Interpolation,
    sink: &mut S,
) -> Result<usize> {
    shape.validate()?;
    info!(
        shape = shape.kind(),
        grid_width = map.width(),
        grid_height = map.height(),
        ?interpolation,
        "Synthesizing mesh"
    );

    match *shape {
        Shape::Panel {
            width_mm,
            height_mm,
        } => panel::generate(map, width_mm, height_mm, sink),
        Shape::Sphere { diameter_mm } => sphere::generate(map, diameter_mm, interpolation, sink),
        Shape::Cylinder {
            diameter_mm,
            height_mm,
        }
        | Shape::Cone {
            diameter_mm,
            height_mm,
        } => cylinder::generate(map, diameter_mm, height_mm, interpolation, sink),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;

    #[test]
    fn test_clamp_segments() {
        assert_eq!(clamp_segments(10), MIN_SEGMENTS);
        assert_eq!(clamp_segments(200), 200);
        assert_eq!(clamp_segments(5000), MAX_SEGMENTS);
    }

    #[test]
    fn test_shape_validation() {
        assert!(Shape::default().validate().is_ok());
        let bad = Shape::Sphere { diameter_mm: 0.0 };
        assert!(matches!(bad.validate(), Err(MeshError::InvalidRange(_))));
        let bad = Shape::Cylinder {
            diameter_mm: 80.0,
            height_mm: f64::INFINITY,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_cone_uses_cylinder_geometry() {
        let map = test_support::ramp_map(5, 4);
        let mut cone = Mesh::new();
        let mut cyl = Mesh::new();
        synthesize(
            &map,
            &Shape::Cone {
                diameter_mm: 60.0,
                height_mm: 40.0,
            },
            Interpolation::Bicubic,
            &mut cone,
        )
        .unwrap();
        synthesize(
            &map,
            &Shape::Cylinder {
                diameter_mm: 60.0,
                height_mm: 40.0,
            },
            Interpolation::Bicubic,
            &mut cyl,
        )
        .unwrap();
        assert_eq!(cone, cyl);
    }

    #[test]
    fn test_parse_topology_aliases() {
        assert_eq!("frame".parse::<Shape>().unwrap(), Shape::default());
        assert_eq!(
            "Bauble".parse::<Shape>().unwrap(),
            Shape::Sphere { diameter_mm: 80.0 }
        );
        assert_eq!("cone".parse::<Shape>().unwrap().kind(), "cone");
        assert!(matches!(
            "torus".parse::<Shape>(),
            Err(MeshError::UnknownShape(_))
        ));
    }

    #[test]
    fn test_with_dimensions_ignores_unused_axes() {
        let sphere =
            Shape::Sphere { diameter_mm: 80.0 }.with_dimensions(Some(10.0), None, Some(120.0));
        assert_eq!(sphere, Shape::Sphere { diameter_mm: 120.0 });
        let panel = Shape::default().with_dimensions(Some(100.0), None, Some(5.0));
        assert_eq!(
            panel,
            Shape::Panel {
                width_mm: 100.0,
                height_mm: 80.0
            }
        );
    }

    #[test]
    fn test_serde_accepts_aliases() {
        let shape: Shape =
            serde_json::from_str(r#"{"topology":"bauble","diameter_mm":60.0}"#).unwrap();
        assert_eq!(shape, Shape::Sphere { diameter_mm: 60.0 });
    }

    #[test]
    fn test_solid_names() {
        assert_eq!(Shape::default().solid_name(), "lithophane");
        assert_eq!(
            Shape::Sphere { diameter_mm: 1.0 }.solid_name(),
            "lithophane_sphere"
        );
        assert_eq!(
            Shape::Cone {
                diameter_mm: 1.0,
                height_mm: 1.0
            }
            .solid_name(),
            "lithophane_cylinder"
        );
    }
}
