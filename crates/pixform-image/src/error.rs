use thiserror::Error;

/// An error type for image construction and transformation operations.
#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image shape.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the pixel data cannot be cast to the requested type.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when affine point correspondences are collinear or nearly so.
    #[error("Degenerate transform: point correspondences are collinear")]
    DegenerateTransform,
}
