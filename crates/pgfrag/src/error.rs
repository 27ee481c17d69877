//! Error types for pgfrag

use thiserror::Error;

/// Result type alias for pgfrag operations
pub type FragResult<T> = Result<T, FragError>;

/// Errors raised while building SQL fragments.
///
/// Errors returned by caller-supplied closures (see
/// [`try_map_with_separator`](crate::util::try_map_with_separator)) are never
/// wrapped in this type; they reach the caller unchanged.
#[derive(Debug, Error)]
pub enum FragError {
    /// Out-of-contract input (e.g. a negative number passed to `pad`)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Validation error (bad identifier, empty insert payload, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FragError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for FragError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
