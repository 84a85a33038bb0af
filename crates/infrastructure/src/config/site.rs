//! Site, template and PDF configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Public site settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host all production traffic must use; empty disables enforcement
    #[serde(default)]
    pub canonical_host: String,

    /// Redirect to the canonical host over https
    #[serde(default)]
    pub is_https: bool,

    /// Path anonymous callers are redirected to
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Site used when an identity carries none, as a ULID
    #[serde(default)]
    pub default_site_id: Option<String>,
}

fn default_login_path() -> String {
    application::settings::DEFAULT_LOGIN_PATH.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            canonical_host: String::new(),
            is_https: false,
            login_path: default_login_path(),
            default_site_id: None,
        }
    }
}

/// Template loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory searched recursively for templates
    #[serde(default = "default_template_dir")]
    pub directory: String,

    /// File extensions treated as templates
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// HTML-escape interpolated values
    #[serde(default = "default_true")]
    pub auto_escape: bool,
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_extensions() -> Vec<String> {
    vec![".html".to_string(), ".tmpl".to_string()]
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            directory: default_template_dir(),
            extensions: default_extensions(),
            auto_escape: true,
        }
    }
}

/// External PDF generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Path or name of the `wkhtmltopdf` executable
    #[serde(default = "default_executable")]
    pub executable_path: String,
}

fn default_executable() -> String {
    "wkhtmltopdf".to_string()
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            executable_path: default_executable(),
        }
    }
}
