//! PDF generation port

use async_trait::async_trait;
use domain::PdfJob;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for converting HTML into PDF bytes
///
/// A call blocks the requesting task until the generator finishes. There is
/// no retry: a failed generation is reported to the caller as is.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PdfGeneratorPort: Send + Sync {
    /// Render `html` with the given job options
    async fn generate(&self, html: &str, job: &PdfJob) -> Result<Vec<u8>, ApplicationError>;

    /// Whether the generator can be invoked at all
    async fn is_available(&self) -> bool;
}
