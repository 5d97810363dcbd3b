//! Errors surfaced by mask rasterization and payload assembly.

/// Rasterization or image-processing failure.
///
/// Deterministic for a given input, so retrying without changing the input
/// reproduces the same error.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    /// Source image bytes could not be decoded.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// A source or target dimension is zero, negative or non-finite.
    #[error("invalid {role} dimension: {width}x{height}")]
    InvalidDimension { role: &'static str, width: f64, height: f64 },

    /// The finished raster could not be encoded.
    #[error("image encode failed: {0}")]
    Encode(String),

    /// The background rasterization task did not complete.
    #[error("rasterization task failed: {0}")]
    Task(String),
}
