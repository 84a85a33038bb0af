//! Gateway state shared across middleware and views

use std::sync::Arc;

use application::{
    AuthGate, GatewaySettings,
    ports::{IdentityPort, PdfGeneratorPort, TemplateRenderer},
};

/// Shared gateway state
///
/// Cloned into every route's gate layer and made available to views as a
/// request extension.
#[derive(Clone)]
pub struct AppState {
    /// Environment, canonical host and login settings
    pub settings: Arc<GatewaySettings>,
    /// Authentication gate over the identity lookup
    pub gate: AuthGate,
    /// Template renderer used by HTML views and error pages
    pub templates: Option<Arc<dyn TemplateRenderer>>,
    /// PDF generator used by template PDFs
    pub pdf: Option<Arc<dyn PdfGeneratorPort>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .field("has_templates", &self.templates.is_some())
            .field("has_pdf", &self.pdf.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state without a renderer or PDF generator
    pub fn new(settings: GatewaySettings, identity: Arc<dyn IdentityPort>) -> Self {
        let gate = AuthGate::new(identity, settings.environment);
        Self {
            settings: Arc::new(settings),
            gate,
            templates: None,
            pdf: None,
        }
    }

    /// Attach a template renderer
    #[must_use]
    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Attach a PDF generator
    #[must_use]
    pub fn with_pdf(mut self, pdf: Arc<dyn PdfGeneratorPort>) -> Self {
        self.pdf = Some(pdf);
        self
    }
}
