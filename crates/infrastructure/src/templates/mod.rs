//! Template engine for rendering pages, error pages and PDF sources
//!
//! Uses the Tera templating engine. Templates are loaded from the configured
//! directory (recursively, filtered by extension) and are addressed by their
//! path relative to that directory, with or without the extension. An
//! embedded `error` template is always available for the HTML error path;
//! a file named `error.html` in the template directory replaces it.
//!
//! # Layouts
//!
//! A layout is an ordinary template that receives the rendered inner page as
//! `yield`:
//!
//! ```text
//! <html><body>{{ yield | safe }}</body></html>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::templates::{TemplateEngine, TemplateFunctionRegistry};
//!
//! let registry = TemplateFunctionRegistry::with_defaults();
//! let engine = TemplateEngine::new(&config.templates, &registry)?;
//!
//! let html = engine.render("invoices/show", &data, Some("layouts/app"))?;
//! ```

mod helpers;
pub mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use application::ApplicationError;
use application::ports::{TemplateRenderer, ViewData};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub use registry::{RegistryError, TemplateFunctionRegistry};

use crate::config::TemplateConfig;

/// Name of the template used for HTML error pages
pub const ERROR_TEMPLATE: &str = "error";

/// Variable a layout reads the rendered page from
pub const YIELD_KEY: &str = "yield";

/// Error type for template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// Template compilation failed
    #[error("Template compilation failed: {0}")]
    Compile(String),

    /// Template directory could not be read
    #[error("Template directory unreadable: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(e: tera::Error) -> Self {
        match e.kind {
            tera::ErrorKind::TemplateNotFound(name) => Self::NotFound(name),
            _ => Self::Render(error_chain(&e)),
        }
    }
}

impl From<TemplateError> for ApplicationError {
    fn from(e: TemplateError) -> Self {
        Self::Template(e.to_string())
    }
}

/// Tera reports the interesting cause several sources deep
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Embedded templates - compiled into the binary
mod embedded {
    pub const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{{ FriendlyError }}</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; margin: 2rem; }
        pre { background: #f5f5f5; padding: 1rem; white-space: pre-wrap; }
        .meta { color: #666; }
    </style>
</head>
<body>
    <h1>{{ FriendlyError }}</h1>
    <pre>{{ NastyError }}</pre>
    <p class="meta">{{ FileName }}:{{ LineNumber }} in {{ FuncName }}</p>
    <p class="meta">Status {{ ErrorCode }}</p>
</body>
</html>
"#;
}

/// Template engine using Tera
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
    config: TemplateConfig,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Build the engine and seal the helper registry
    ///
    /// A missing template directory is not an error; only the embedded
    /// templates are available then.
    pub fn new(
        config: &TemplateConfig,
        registry: &TemplateFunctionRegistry,
    ) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        // Set auto-escape based on config
        tera.autoescape_on(if config.auto_escape {
            vec![".html", ".htm", ".xml"]
        } else {
            vec![]
        });

        tera.add_raw_template("error.html", embedded::ERROR_PAGE)
            .map_err(|e| TemplateError::Compile(error_chain(&e)))?;

        let dir = Path::new(&config.directory);
        if dir.is_dir() {
            let mut files = Vec::new();
            collect_templates(dir, dir, &config.extensions, &mut files)?;
            let count = files.len();
            tera.add_template_files(files)
                .map_err(|e| TemplateError::Compile(error_chain(&e)))?;
            info!(dir = %config.directory, count, "Loaded templates");
        } else {
            debug!(dir = %config.directory, "Template directory missing, using embedded templates only");
        }

        registry.seal();
        registry.install_into(&mut tera);

        Ok(Self {
            tera: Arc::new(tera),
            config: config.clone(),
        })
    }

    /// Build an engine from raw `(name, source)` pairs
    ///
    /// Used where templates are generated rather than read from disk.
    pub fn from_sources<'a, I>(
        sources: I,
        registry: &TemplateFunctionRegistry,
    ) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let config = TemplateConfig::default();
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html", ".htm", ".xml"]);
        tera.add_raw_template("error.html", embedded::ERROR_PAGE)
            .map_err(|e| TemplateError::Compile(error_chain(&e)))?;
        tera.add_raw_templates(sources)
            .map_err(|e| TemplateError::Compile(error_chain(&e)))?;

        registry.seal();
        registry.install_into(&mut tera);

        Ok(Self {
            tera: Arc::new(tera),
            config,
        })
    }

    /// Resolve a template name, trying each configured extension
    fn resolve(&self, name: &str) -> Option<String> {
        let names: Vec<&str> = self.tera.get_template_names().collect();
        if names.contains(&name) {
            return Some(name.to_string());
        }
        self.config
            .extensions
            .iter()
            .map(|ext| format!("{name}{ext}"))
            .find(|candidate| names.contains(&candidate.as_str()))
    }

    /// Render a template with the given data
    #[instrument(skip(self, data))]
    pub fn render_template(&self, name: &str, data: &ViewData) -> Result<String, TemplateError> {
        let resolved = self
            .resolve(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(&resolved, &context)?)
    }

    /// Render a template, then the layout with the result as `yield`
    pub fn render_with_layout(
        &self,
        name: &str,
        data: &ViewData,
        layout: &str,
    ) -> Result<String, TemplateError> {
        let inner = self.render_template(name, data)?;
        let mut outer = data.clone();
        outer.insert(YIELD_KEY.to_string(), serde_json::Value::String(inner));
        self.render_template(layout, &outer)
    }

    /// List all available template names
    #[must_use]
    pub fn list_templates(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render(
        &self,
        template: &str,
        data: &ViewData,
        layout: Option<&str>,
    ) -> Result<String, ApplicationError> {
        let rendered = match layout {
            Some(layout) => self.render_with_layout(template, data, layout),
            None => self.render_template(template, data),
        };
        rendered.map_err(ApplicationError::from)
    }

    fn has_template(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

fn collect_templates(
    root: &Path,
    dir: &Path,
    extensions: &[String],
    out: &mut Vec<(PathBuf, Option<String>)>,
) -> Result<(), TemplateError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_templates(root, &path, extensions, out)?;
            continue;
        }
        let file_name = path.to_string_lossy();
        if !extensions.iter().any(|ext| file_name.ends_with(ext.as_str())) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        out.push((path.clone(), Some(name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    fn data(value: serde_json::Value) -> ViewData {
        match value {
            serde_json::Value::Object(map) => map,
            _ => ViewData::new(),
        }
    }

    fn engine_with(sources: &[(&str, &str)]) -> TemplateEngine {
        let registry = TemplateFunctionRegistry::with_defaults();
        TemplateEngine::from_sources(sources.iter().copied(), &registry).unwrap()
    }

    #[test]
    fn renders_by_name_without_extension() {
        let engine = engine_with(&[("hello.html", "Hello {{ Name }}")]);
        let out = engine
            .render("hello", &data(json!({"Name": "Ada"})), None)
            .unwrap();
        assert_eq!(out, "Hello Ada");
        assert!(engine.has_template("hello"));
        assert!(engine.has_template("hello.html"));
        assert!(!engine.has_template("missing"));
    }

    #[test]
    fn layout_receives_rendered_page() {
        let engine = engine_with(&[
            ("page.html", "<p>{{ Name }}</p>"),
            ("layout.html", "<main>{{ yield | safe }}</main>"),
        ]);
        let out = engine
            .render("page", &data(json!({"Name": "Ada"})), Some("layout"))
            .unwrap();
        assert_eq!(out, "<main><p>Ada</p></main>");
    }

    #[test]
    fn html_templates_escape_values() {
        let engine = engine_with(&[("page.html", "{{ Name }}")]);
        let out = engine
            .render("page", &data(json!({"Name": "<script>"})), None)
            .unwrap();
        assert_eq!(out, "&lt;script&gt;");
    }

    #[test]
    fn missing_template_is_not_found() {
        let engine = engine_with(&[]);
        let err = engine.render_template("nope", &ViewData::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn render_failure_maps_to_application_error() {
        let engine = engine_with(&[("broken.html", "{{ missing_var }}")]);
        let err = engine.render("broken", &ViewData::new(), None).unwrap_err();
        assert!(matches!(err, ApplicationError::Template(_)));
    }

    #[test]
    fn embedded_error_template_renders_report_fields() {
        let engine = engine_with(&[]);
        let out = engine
            .render(
                ERROR_TEMPLATE,
                &data(json!({
                    "FriendlyError": "Could not load invoice",
                    "NastyError": "row not found",
                    "LineNumber": 42,
                    "FuncName": "app::invoices::show",
                    "FileName": "src/invoices.rs",
                    "ErrorCode": 500,
                })),
                None,
            )
            .unwrap();
        assert!(out.contains("Could not load invoice"));
        assert!(out.contains("row not found"));
        assert!(out.contains("invoices.rs:42"));
        assert!(out.contains("Status 500"));
    }

    #[test]
    fn loads_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("invoices")).unwrap();
        fs::write(dir.path().join("invoices/show.html"), "Invoice {{ Id }}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let config = TemplateConfig {
            directory: dir.path().to_string_lossy().into_owned(),
            ..TemplateConfig::default()
        };
        let registry = TemplateFunctionRegistry::with_defaults();
        let engine = TemplateEngine::new(&config, &registry).unwrap();

        assert!(engine.has_template("invoices/show"));
        assert!(!engine.has_template("notes"));
        assert!(registry.is_sealed());
        let out = engine
            .render("invoices/show", &data(json!({"Id": 7})), None)
            .unwrap();
        assert_eq!(out, "Invoice 7");
    }

    #[test]
    fn missing_directory_still_has_error_template() {
        let config = TemplateConfig {
            directory: "/nonexistent/templates".to_string(),
            ..TemplateConfig::default()
        };
        let engine = TemplateEngine::new(&config, &TemplateFunctionRegistry::new()).unwrap();
        assert!(engine.has_template(ERROR_TEMPLATE));
    }

    #[test]
    fn helpers_are_available() {
        let engine = engine_with(&[("t.html", "{{ Title | slugify }}")]);
        let out = engine
            .render("t", &data(json!({"Title": "Hello World"})), None)
            .unwrap();
        assert_eq!(out, "hello-world");
    }
}
