//! Error types for core operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request carried neither a drawing nor a compound name.
    #[error("Nothing to analyze: {0}")]
    Validation(String),

    /// The supplied image is neither PNG nor JPEG.
    #[error("Unsupported image format: only PNG and JPEG images can be analysed")]
    UnsupportedImage,

    /// An operation was attempted while another one holds the slot.
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Preference storage could not be read or written.
    #[error("Preference storage error: {0}")]
    Preference(#[from] std::io::Error),

    /// A value could not be parsed.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
