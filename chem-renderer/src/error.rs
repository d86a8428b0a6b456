//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while drawing, laying out or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The raster surface could not be created or resized.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Image encoding failed.
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Document export failed.
    #[error("Export failed: {0}")]
    Export(String),
}
