use litho_imaging::ImagingError;
use litho_mesh::MeshError;

/// Errors that can abort a conversion request.
///
/// A conversion either yields a complete STL buffer or one of these; partial
/// output is never returned.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailure(#[from] image::ImageError),

    #[error("Conversion superseded by a newer request")]
    Superseded,

    #[error("Image processing failed: {0}")]
    Imaging(ImagingError),

    #[error("Mesh generation failed: {0}")]
    Mesh(MeshError),
}

impl From<ImagingError> for ConvertError {
    fn from(e: ImagingError) -> Self {
        match e {
            ImagingError::EmptyImage { .. } | ImagingError::BufferSize { .. } => {
                ConvertError::InvalidDimension(e.to_string())
            }
            ImagingError::InvalidParameter(msg) => ConvertError::InvalidRange(msg),
            other => ConvertError::Imaging(other),
        }
    }
}

impl From<MeshError> for ConvertError {
    fn from(e: MeshError) -> Self {
        match e {
            MeshError::InvalidDimension { .. } => ConvertError::InvalidDimension(e.to_string()),
            MeshError::InvalidRange(msg) => ConvertError::InvalidRange(msg),
            other => ConvertError::Mesh(other),
        }
    }
}
