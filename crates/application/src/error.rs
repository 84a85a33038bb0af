//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// PDF generation failed
    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::MissingParameter("id".to_string()).into();
        assert_eq!(err.to_string(), "Missing parameter: id");
    }

    #[test]
    fn pdf_generation_message() {
        let err = ApplicationError::PdfGeneration("exit status 1".to_string());
        assert_eq!(err.to_string(), "PDF generation failed: exit status 1");
    }

    #[test]
    fn template_error_message() {
        let err = ApplicationError::Template("missing 'error'".to_string());
        assert_eq!(err.to_string(), "Template error: missing 'error'");
    }
}
