//! Analysis error taxonomy.

use chem_core::{CoreError, ErrorCategory};
use thiserror::Error;

/// Result type for analysis operations.
pub type AiResult<T> = Result<T, AnalysisError>;

/// Every way an analysis can fail. None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Neither a drawing nor a compound name was provided.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The API key is missing or was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API key lacks access to the model or region.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The backend is overloaded or the quota is exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport failure (connect, timeout, interrupted body).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A network failure reported in an error description.
    #[error("network error: {0}")]
    Network(String),

    /// The input was rejected by safety filtering.
    #[error("blocked by content policy: {0}")]
    ContentPolicy(String),

    /// The response did not match the declared schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The client configuration is unusable (e.g. bad endpoint URL).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Anything else; the backend's message is kept verbatim.
    #[error("{0}")]
    Unknown(String),
}

impl AnalysisError {
    /// Build the error matching a classification, keeping `detail` as context.
    #[must_use]
    pub fn from_category(category: ErrorCategory, detail: &str) -> Self {
        let detail = detail.to_string();
        match category {
            ErrorCategory::Validation => Self::Validation(detail),
            ErrorCategory::Auth => Self::Auth(detail),
            ErrorCategory::AccessDenied => Self::AccessDenied(detail),
            ErrorCategory::RateLimited => Self::RateLimited(detail),
            ErrorCategory::ContentPolicy => Self::ContentPolicy(detail),
            ErrorCategory::MalformedResponse => Self::MalformedResponse(detail),
            ErrorCategory::Network => Self::Network(detail),
            ErrorCategory::Unknown(message) => Self::Unknown(message),
        }
    }

    /// User-facing category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Auth(_) => ErrorCategory::Auth,
            Self::AccessDenied(_) => ErrorCategory::AccessDenied,
            Self::RateLimited(_) => ErrorCategory::RateLimited,
            Self::Transport(_) | Self::Network(_) => ErrorCategory::Network,
            Self::ContentPolicy(_) => ErrorCategory::ContentPolicy,
            Self::MalformedResponse(_) => ErrorCategory::MalformedResponse,
            Self::InvalidConfig(message) | Self::Unknown(message) => {
                ErrorCategory::Unknown(message.clone())
            }
        }
    }

    /// The single human-readable message shown to the student.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.category().user_message()
    }
}

impl From<CoreError> for AnalysisError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::Validation(message),
            other => Self::Unknown(other.to_string()),
        }
    }
}
