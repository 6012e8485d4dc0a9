//! Working-resolution policy.
//!
//! Picks the raster size the pipeline runs at from the source dimensions,
//! then guards the choice against a memory ceiling. Exceeding the ceiling is
//! not an error: the policy substitutes a fixed fallback size and reports a
//! [`ResolutionWarning`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::Result;
use crate::buffer::ensure_non_empty;

/// One step of the tier table: sources whose longest side is below `below`
/// are worked at `max_dimension`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionTier {
    pub below: u32,
    pub max_dimension: u32,
}

/// Low / medium / high tiers. Anything larger falls through to [`ULTRA_DIMENSION`].
pub const DEFAULT_TIERS: &[ResolutionTier] = &[
    ResolutionTier {
        below: 500,
        max_dimension: 400,
    },
    ResolutionTier {
        below: 1500,
        max_dimension: 800,
    },
    ResolutionTier {
        below: 3000,
        max_dimension: 1200,
    },
];

/// Working max dimension for sources of 3000px and up.
pub const ULTRA_DIMENSION: u32 = 2000;

/// Estimated bytes held per working pixel across the pipeline.
pub const BYTES_PER_SAMPLE: u64 = 32;

/// Memory ceiling for the estimate (500 MiB).
pub const MEMORY_CEILING_BYTES: u64 = 500 * 1024 * 1024;

/// Size substituted when the estimate reaches the ceiling.
pub const FALLBACK_SIZE: (u32, u32) = (800, 800);

/// Smallest working size on the minor axis.
const MIN_AXIS: u32 = 2;

/// Non-fatal outcome of the memory guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// The computed size would need `estimated_bytes`, at or above the ceiling.
    ResourceLimitExceeded {
        requested_width: u32,
        requested_height: u32,
        estimated_bytes: u64,
        ceiling_bytes: u64,
    },
}

/// Output of [`ResolutionPolicy::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkingResolution {
    pub width: u32,
    pub height: u32,
    pub warning: Option<ResolutionWarning>,
}

/// Tiered resolution policy with a memory guard.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    pub tiers: &'static [ResolutionTier],
    pub top_dimension: u32,
    pub bytes_per_sample: u64,
    pub memory_ceiling_bytes: u64,
    pub fallback: (u32, u32),
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS,
            top_dimension: ULTRA_DIMENSION,
            bytes_per_sample: BYTES_PER_SAMPLE,
            memory_ceiling_bytes: MEMORY_CEILING_BYTES,
            fallback: FALLBACK_SIZE,
        }
    }
}

impl ResolutionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: override the memory ceiling.
    pub fn with_memory_ceiling(mut self, bytes: u64) -> Self {
        self.memory_ceiling_bytes = bytes;
        self
    }

    /// Builder: override the fallback size.
    pub fn with_fallback(mut self, width: u32, height: u32) -> Self {
        self.fallback = (width, height);
        self
    }

    /// Target length of the longer working axis for a source of this size.
    pub fn max_dimension_for(&self, width: u32, height: u32) -> u32 {
        let longest = width.max(height);
        self.tiers
            .iter()
            .find(|tier| longest < tier.below)
            .map_or(self.top_dimension, |tier| tier.max_dimension)
    }

    /// Estimated working memory for a raster of this size.
    pub fn estimate_bytes(&self, width: u32, height: u32) -> u64 {
        u64::from(width) * u64::from(height) * self.bytes_per_sample
    }

    /// Resolve the working size for a source image.
    ///
    /// The longer axis is set to the tier value and the shorter one scaled to
    /// keep the aspect ratio (rounded, at least 2px). Square sources take the
    /// height branch, which gives the same result.
    pub fn resolve(&self, width: u32, height: u32) -> Result<WorkingResolution> {
        ensure_non_empty(width, height)?;

        let target = self.max_dimension_for(width, height);
        let (w, h) = if width > height {
            let ratio = f64::from(height) / f64::from(width);
            (target, scale_axis(target, ratio))
        } else {
            let ratio = f64::from(width) / f64::from(height);
            (scale_axis(target, ratio), target)
        };

        let estimated_bytes = self.estimate_bytes(w, h);
        if estimated_bytes >= self.memory_ceiling_bytes {
            let (fw, fh) = self.fallback;
            warn!(
                requested_width = w,
                requested_height = h,
                estimated_bytes,
                ceiling_bytes = self.memory_ceiling_bytes,
                fallback_width = fw,
                fallback_height = fh,
                "Working resolution exceeds memory ceiling, using fallback size"
            );
            return Ok(WorkingResolution {
                width: fw,
                height: fh,
                warning: Some(ResolutionWarning::ResourceLimitExceeded {
                    requested_width: w,
                    requested_height: h,
                    estimated_bytes,
                    ceiling_bytes: self.memory_ceiling_bytes,
                }),
            });
        }

        debug!(
            source_width = width,
            source_height = height,
            working_width = w,
            working_height = h,
            "Resolved working resolution"
        );
        Ok(WorkingResolution {
            width: w,
            height: h,
            warning: None,
        })
    }
}

fn scale_axis(target: u32, ratio: f64) -> u32 {
    ((f64::from(target) * ratio).round() as u32).max(MIN_AXIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let policy = ResolutionPolicy::default();
        assert_eq!(policy.max_dimension_for(499, 10), 400);
        assert_eq!(policy.max_dimension_for(500, 10), 800);
        assert_eq!(policy.max_dimension_for(10, 1499), 800);
        assert_eq!(policy.max_dimension_for(1500, 1500), 1200);
        assert_eq!(policy.max_dimension_for(2999, 1), 1200);
        assert_eq!(policy.max_dimension_for(3000, 1), 2000);
    }

    #[test]
    fn test_ultra_landscape_keeps_aspect() {
        let res = ResolutionPolicy::default().resolve(4000, 2000).unwrap();
        assert_eq!(res.width, ULTRA_DIMENSION);
        assert_eq!(res.height, 1000);
        assert!(res.warning.is_none());
    }

    #[test]
    fn test_portrait_scales_width() {
        let res = ResolutionPolicy::default().resolve(300, 450).unwrap();
        assert_eq!(res.height, 400);
        // 400 * 300/450 = 266.67
        assert_eq!(res.width, 267);
    }

    #[test]
    fn test_square_source() {
        let res = ResolutionPolicy::default().resolve(1000, 1000).unwrap();
        assert_eq!((res.width, res.height), (800, 800));
    }

    #[test]
    fn test_minor_axis_floor() {
        let res = ResolutionPolicy::default().resolve(5000, 1).unwrap();
        assert_eq!(res.width, 2000);
        assert_eq!(res.height, 2);
    }

    #[test]
    fn test_memory_ceiling_substitutes_fallback() {
        // 1200x1200x32 bytes = 46_080_000 bytes
        let policy = ResolutionPolicy::default().with_memory_ceiling(10_000_000);
        let res = policy.resolve(2000, 2000).unwrap();
        assert_eq!((res.width, res.height), FALLBACK_SIZE);
        assert_eq!(
            res.warning,
            Some(ResolutionWarning::ResourceLimitExceeded {
                requested_width: 1200,
                requested_height: 1200,
                estimated_bytes: 46_080_000,
                ceiling_bytes: 10_000_000,
            })
        );
    }

    #[test]
    fn test_memory_ceiling_is_deterministic() {
        let policy = ResolutionPolicy::default()
            .with_memory_ceiling(1)
            .with_fallback(64, 48);
        let a = policy.resolve(123, 456).unwrap();
        let b = policy.resolve(123, 456).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (64, 48));
    }

    #[test]
    fn test_default_ceiling_not_reached_by_tiers() {
        let res = ResolutionPolicy::default().resolve(9000, 9000).unwrap();
        assert_eq!((res.width, res.height), (2000, 2000));
        assert!(res.warning.is_none());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(ResolutionPolicy::default().resolve(0, 100).is_err());
    }
}
