//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Site identifier is not a valid ULID
    #[error("Invalid site id: {0}")]
    InvalidSiteId(String),

    /// Environment name is not recognised
    #[error("Invalid environment: {0}. Use 'development' or 'production'")]
    InvalidEnvironment(String),

    /// A request parameter could not be converted
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    /// A required request parameter is absent
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
}

impl DomainError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
