//! PDF render parameters and the derived generator job
//!
//! [`PdfRenderParams`] is what a caller asks for. [`PdfJob`] is the complete
//! option set handed to the PDF generator, derived from the parameters with
//! the fixed page settings applied.

use serde::{Deserialize, Serialize};

/// Resolution used for every render
pub const PDF_DPI: u32 = 300;

/// JavaScript delay applied when the caller supplies neither a ready flag nor a delay
pub const DEFAULT_JAVASCRIPT_DELAY_MS: u32 = 250;

/// Caller-supplied PDF render parameters
///
/// Field names on the wire are camelCase (`javascriptReadyFlag`, `isMarginless`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfRenderParams {
    /// Source URL; ignored when rendering from a template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// JavaScript delay in milliseconds; zero means "use the default"
    pub delay: u32,
    /// Name of the `window.status` value the page sets once it is ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript_ready_flag: Option<String>,
    /// Forward JavaScript console output from the renderer
    pub is_debug: bool,
    /// Zero all page margins
    pub is_marginless: bool,
    /// Landscape instead of portrait
    pub is_landscape: bool,
}

impl PdfRenderParams {
    /// Parameters with every flag off and no delay override
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for `window.status` to equal `flag` instead of a fixed delay
    #[must_use]
    pub fn with_ready_flag(mut self, flag: impl Into<String>) -> Self {
        self.javascript_ready_flag = Some(flag.into());
        self
    }

    /// Override the JavaScript delay
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay = delay_ms;
        self
    }

    /// Zero all page margins
    #[must_use]
    pub const fn marginless(mut self) -> Self {
        self.is_marginless = true;
        self
    }

    /// Render in landscape
    #[must_use]
    pub const fn landscape(mut self) -> Self {
        self.is_landscape = true;
        self
    }

    /// Enable JavaScript debugging output
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.is_debug = true;
        self
    }
}

/// Physical page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// ISO A4
    A4,
}

impl PageSize {
    /// Name understood by the generator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "A4",
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait
    #[default]
    Portrait,
    /// Landscape
    Landscape,
}

impl Orientation {
    /// Name understood by the generator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// How the generator decides the page has finished rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadySignal {
    /// Wait until `window.status` equals the given value
    WindowStatus(String),
    /// Wait a fixed number of milliseconds
    JavascriptDelay(u32),
}

/// Complete option set for one PDF generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfJob {
    /// Dots per inch
    pub dpi: u32,
    /// Collate copies when printing
    pub collate: bool,
    /// Page size
    pub page_size: PageSize,
    /// `Some(0)` zeroes every margin, `None` keeps the generator defaults
    pub margin_mm: Option<u32>,
    /// Page orientation
    pub orientation: Orientation,
    /// Ready detection
    pub ready: ReadySignal,
    /// Forward JavaScript console output
    pub debug_javascript: bool,
    /// Allow the generator to abort long-running scripts
    pub stop_slow_scripts: bool,
}

impl PdfJob {
    /// Derive the generator options from caller parameters
    ///
    /// A non-empty ready flag always wins over a delay. Without a flag a zero
    /// delay falls back to [`DEFAULT_JAVASCRIPT_DELAY_MS`].
    #[must_use]
    pub fn from_params(params: &PdfRenderParams) -> Self {
        let ready = match params.javascript_ready_flag.as_deref() {
            Some(flag) if !flag.is_empty() => ReadySignal::WindowStatus(flag.to_string()),
            _ if params.delay == 0 => ReadySignal::JavascriptDelay(DEFAULT_JAVASCRIPT_DELAY_MS),
            _ => ReadySignal::JavascriptDelay(params.delay),
        };

        Self {
            dpi: PDF_DPI,
            collate: false,
            page_size: PageSize::A4,
            margin_mm: params.is_marginless.then_some(0),
            orientation: if params.is_landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            ready,
            debug_javascript: params.is_debug,
            stop_slow_scripts: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_settings_and_default_delay() {
        let job = PdfJob::from_params(&PdfRenderParams::new());
        assert_eq!(job.dpi, 300);
        assert!(!job.collate);
        assert_eq!(job.page_size, PageSize::A4);
        assert_eq!(job.margin_mm, None);
        assert_eq!(job.orientation, Orientation::Portrait);
        assert_eq!(job.ready, ReadySignal::JavascriptDelay(250));
        assert!(!job.stop_slow_scripts);
        assert!(!job.debug_javascript);
    }

    #[test]
    fn caller_delay_overrides_default() {
        let job = PdfJob::from_params(&PdfRenderParams::new().with_delay(1200));
        assert_eq!(job.ready, ReadySignal::JavascriptDelay(1200));
    }

    #[test]
    fn ready_flag_wins_over_delay() {
        let params = PdfRenderParams::new()
            .with_delay(1200)
            .with_ready_flag("chart-ready");
        let job = PdfJob::from_params(&params);
        assert_eq!(job.ready, ReadySignal::WindowStatus("chart-ready".to_string()));
    }

    #[test]
    fn empty_ready_flag_is_ignored() {
        let job = PdfJob::from_params(&PdfRenderParams::new().with_ready_flag(""));
        assert_eq!(job.ready, ReadySignal::JavascriptDelay(250));
    }

    #[test]
    fn marginless_and_landscape() {
        let params = PdfRenderParams::new().marginless().landscape().debug();
        let job = PdfJob::from_params(&params);
        assert_eq!(job.margin_mm, Some(0));
        assert_eq!(job.orientation, Orientation::Landscape);
        assert!(job.debug_javascript);
    }

    #[test]
    fn params_deserialize_from_camel_case() {
        let params: PdfRenderParams = serde_json::from_str(
            r#"{"url":"https://example.com","javascriptReadyFlag":"done","isLandscape":true}"#,
        )
        .unwrap();
        assert_eq!(params.url.as_deref(), Some("https://example.com"));
        assert_eq!(params.javascript_ready_flag.as_deref(), Some("done"));
        assert!(params.is_landscape);
        assert_eq!(params.delay, 0);
    }
}
