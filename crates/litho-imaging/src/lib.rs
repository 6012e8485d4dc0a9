//! Image preparation for lithophane generation.
//!
//! Provides the working-resolution policy, Lanczos3 resampling to that
//! resolution, and the preprocessing filters (median denoise, local
//! contrast equalization, unsharp mask, gamma) chained by named profiles.
//! Every filter takes an RGBA8 buffer and returns a new grey RGBA8 buffer.

pub mod buffer;
pub mod contrast;
pub mod denoise;
pub mod gamma;
pub mod profile;
pub mod resize;
pub mod resolution;
pub mod sharpen;

// Re-exports for convenience
pub use buffer::{PixelBuffer, pixel_buffer_from_raw};
pub use contrast::equalize_local;
pub use denoise::median_filter;
pub use gamma::gamma_correct;
pub use profile::{FilterSettings, FilterStep, PreprocessProfile, preprocess};
pub use resize::resize_to_working;
pub use resolution::{ResolutionPolicy, ResolutionWarning, WorkingResolution};
pub use sharpen::unsharp_mask;

/// Errors that can occur while preparing an image.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Pixel buffer size mismatch: expected {expected} samples for {width}x{height}, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Median window must be odd and non-zero, got {0}")]
    InvalidKernel(u32),

    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown preprocess profile '{0}' (expected none, basic, portrait or technical)")]
    UnknownProfile(String),
}

/// Result type alias for imaging operations.
pub type Result<T> = std::result::Result<T, ImagingError>;
