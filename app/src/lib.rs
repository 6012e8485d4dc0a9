//! Image to lithophane STL conversion.
//!
//! [`convert`] takes a decoded RGBA8 buffer and a [`LithoConfig`] and returns
//! a complete ASCII STL document plus a [`ConversionReport`]. Decoding image
//! files and writing outputs is left to the caller (see the `lithophane`
//! binary).

pub mod config;
pub mod convert;
pub mod error;
pub mod preview;

pub use config::LithoConfig;
pub use convert::{
    Conversion, ConversionReport, convert, convert_with_policy, convert_with_token,
    default_file_name,
};
pub use error::ConvertError;
pub use preview::render_preview;

pub use litho_imaging::{PixelBuffer, PreprocessProfile, pixel_buffer_from_raw};
pub use litho_mesh::{Interpolation, Shape};
