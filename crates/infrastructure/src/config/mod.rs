//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `site`: canonical host, login path, templates and PDF generation
//! - `security`: API keys
//!
//! Values are layered: built-in defaults, then an optional `config` file
//! (any format the `config` crate understands), then `PORTICO__`-prefixed
//! environment variables such as `PORTICO__SITE__CANONICAL_HOST`.

mod security;
mod server;
mod site;

use std::path::Path;

use application::GatewaySettings;
use domain::{DomainError, Environment, SiteId};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use security::{ApiKeyEntry, SecurityConfig};
pub use server::ServerConfig;
pub use site::{PdfConfig, SiteConfig, TemplateConfig};

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "PORTICO";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    ///
    /// Production enables canonical-host enforcement and turns `Todo`
    /// routes into `Secure` ones.
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Public site configuration
    #[serde(default)]
    pub site: SiteConfig,

    /// Template configuration
    #[serde(default)]
    pub templates: TemplateConfig,

    /// PDF generator configuration
    #[serde(default)]
    pub pdf: PdfConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional `config` file
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, falling back to `config`
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = path.map_or_else(
            || config::File::with_name("config").required(false),
            |p| config::File::from(p).required(true),
        );

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("templates.directory", "templates")?
            .set_default("pdf.executable_path", "wkhtmltopdf")?
            .add_source(file)
            // Override with environment variables (e.g., PORTICO__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check whether the running environment is production
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Check whether the running environment is development
    #[must_use]
    pub const fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Derive the per-request gateway settings
    ///
    /// # Errors
    ///
    /// Returns an error when the configured default site is not a valid ULID.
    pub fn gateway_settings(&self) -> Result<GatewaySettings, DomainError> {
        let mut settings = GatewaySettings::new(self.environment)
            .with_canonical_host(self.site.canonical_host.clone(), self.site.is_https)
            .with_login_path(self.site.login_path.clone());

        if let Some(raw) = self.site.default_site_id.as_deref() {
            settings = settings.with_default_site(SiteId::parse(raw)?);
        }

        if settings.is_production() && settings.canonical_host.is_none() {
            warn!("Running in production without a canonical host; host enforcement is off");
        }

        Ok(settings)
    }
}
