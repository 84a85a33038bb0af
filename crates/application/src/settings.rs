//! Gateway settings read by the policy services

use domain::{Environment, SiteId};

/// Login path used when none is configured
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Settings consulted for every request
///
/// Built once from the application configuration and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Running environment
    pub environment: Environment,
    /// Host every production request must use; `None` disables enforcement
    pub canonical_host: Option<String>,
    /// Whether redirects to the canonical host use `https`
    pub is_https: bool,
    /// Target of anonymous-caller redirects
    pub login_path: String,
    /// Site attached to the context when the identity has none
    pub default_site_id: Option<SiteId>,
}

impl GatewaySettings {
    /// Settings for the given environment with everything else at defaults
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            canonical_host: None,
            is_https: false,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            default_site_id: None,
        }
    }

    /// Enforce a canonical host; blank values disable enforcement
    #[must_use]
    pub fn with_canonical_host(mut self, host: impl Into<String>, is_https: bool) -> Self {
        let host = host.into();
        self.canonical_host = if host.trim().is_empty() {
            None
        } else {
            Some(host.trim().to_string())
        };
        self.is_https = is_https;
        self
    }

    /// Override the login path
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Attach a fallback site
    #[must_use]
    pub const fn with_default_site(mut self, site_id: SiteId) -> Self {
        self.default_site_id = Some(site_id);
        self
    }

    /// Check whether the gateway runs in production
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Check whether the gateway runs in development
    #[must_use]
    pub const fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
