//! Template rendering port

use crate::error::ApplicationError;

/// Key-value data handed to a template
pub type ViewData = serde_json::Map<String, serde_json::Value>;

/// Port for rendering named templates
///
/// Implementations are built once at startup and shared read-only between
/// requests.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` against `data`, optionally wrapped in `layout`
    ///
    /// The layout receives the rendered template as `yield`.
    fn render(
        &self,
        template: &str,
        data: &ViewData,
        layout: Option<&str>,
    ) -> Result<String, ApplicationError>;

    /// Whether a template with this name is loaded
    fn has_template(&self, name: &str) -> bool;
}
