//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer: API key identity
//! lookup, Tera templates and `wkhtmltopdf` PDF generation. Also owns
//! configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod logging;
pub mod templates;

pub use adapters::*;
pub use config::{
    AppConfig, ApiKeyEntry, PdfConfig, SecurityConfig, ServerConfig, SiteConfig, TemplateConfig,
};
pub use logging::{LoggingError, init_logging};
pub use templates::{RegistryError, TemplateEngine, TemplateError, TemplateFunctionRegistry};
