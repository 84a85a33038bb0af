//! Response view
//!
//! A [`View`] is extracted once per request. Handlers accumulate template
//! data with [`View::add`] and finish with exactly one terminal method, each
//! of which consumes the view and returns the response.
//!
//! ```rust,ignore
//! async fn show(mut view: View, params: Params) -> Response {
//!     match load_invoice(params.int("id")).await {
//!         Ok(invoice) => {
//!             view.add("Invoice", &invoice);
//!             view.html(StatusCode::OK, "invoices/show")
//!         },
//!         Err(e) => view_error!(view, StatusCode::NOT_FOUND, "Invoice not found", [Some(e)]),
//!     }
//! }
//! ```
//!
//! [`view_error!`](crate::view_error) attributes the report to the file,
//! line and enclosing function of the handler. The plain error methods are
//! `#[track_caller]` and only know the file and line.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use application::{
    RequestContext,
    ports::{TemplateRenderer, ViewData},
};
use axum::{
    Json,
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION},
        request::Parts,
    },
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{Datelike, Utc};
use domain::{CallSite, ErrorReport, PdfJob, PdfRenderParams};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::reporter;
use crate::state::AppState;

/// Template rendered by the HTML error path
pub const ERROR_TEMPLATE: &str = "error";

/// Content type of Excel workbooks
pub const EXCEL_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Content type of PDF documents
pub const PDF_MIME: &str = "application/pdf";

const TEXT_MIME: &str = "text/plain; charset=utf-8";

/// Statuses a redirect may use
const REDIRECT_STATUSES: [StatusCode; 5] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::NOT_MODIFIED,
    StatusCode::UNAUTHORIZED,
];

/// Report a failure from a handler, attributed to the enclosing function
///
/// Negotiates the format from the `Accept` header unless one is named:
///
/// ```rust,ignore
/// view_error!(view, StatusCode::NOT_FOUND, "Invoice not found", [Some(e)])
/// view_error!(json: view, StatusCode::BAD_REQUEST, "Bad input", [None::<String>])
/// ```
#[macro_export]
macro_rules! view_error {
    (html: $view:expr, $status:expr, $friendly:expr, $errors:expr $(,)?) => {
        $view.error_html_at($crate::__domain::call_site!(), $status, $friendly, $errors)
    };
    (json: $view:expr, $status:expr, $friendly:expr, $errors:expr $(,)?) => {
        $view.error_json_at($crate::__domain::call_site!(), $status, $friendly, $errors)
    };
    (text: $view:expr, $status:expr, $friendly:expr, $errors:expr $(,)?) => {
        $view.error_text_at($crate::__domain::call_site!(), $status, $friendly, $errors)
    };
    ($view:expr, $status:expr, $friendly:expr, $errors:expr $(,)?) => {
        $view.error_at($crate::__domain::call_site!(), $status, $friendly, $errors)
    };
}

/// Serialization picked for an error response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Html,
    Json,
    Text,
}

impl ErrorFormat {
    /// Choose the format from an `Accept` header value by substring match
    #[must_use]
    pub fn negotiate(accept: &str) -> Self {
        if accept.contains("text/html") {
            Self::Html
        } else if accept.contains("application/json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Per-request output builder
pub struct View {
    state: Option<AppState>,
    accept: String,
    data: ViewData,
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("accept", &self.accept)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for View
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

impl View {
    /// Create a view with the default data set
    ///
    /// Every view carries `Now` and `Year`; `Context` is added when the
    /// request passed context enrichment.
    pub fn new(state: Option<AppState>, accept: impl Into<String>, context: Option<&RequestContext>) -> Self {
        let now = Utc::now();
        let mut view = Self {
            state,
            accept: accept.into(),
            data: ViewData::new(),
        };
        view.add("Now", &now.to_rfc3339());
        view.add("Year", &now.year());
        if let Some(context) = context {
            view.add("Context", context);
        }
        view
    }

    /// Build a view from the gateway state and context in the request
    pub fn from_parts(parts: &Parts) -> Self {
        let accept = header_str(&parts.headers, ACCEPT.as_str());
        Self::new(
            parts.extensions.get::<AppState>().cloned(),
            accept,
            parts.extensions.get::<RequestContext>(),
        )
    }

    /// Add a value to the template data, replacing any previous one
    pub fn add<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "View data is not serializable, storing null");
            Value::Null
        });
        self.data.insert(key.to_string(), value);
        self
    }

    /// Read back a template value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn renderer(&self) -> Result<Arc<dyn TemplateRenderer>, &'static str> {
        let state = self.state.as_ref().ok_or("Dependencies not set")?;
        state.templates.clone().ok_or("Renderer not set")
    }

    /// Render a template with the accumulated data
    #[track_caller]
    pub fn html(self, status: StatusCode, template: &str) -> Response {
        self.render_html(status, template, None, CallSite::caller())
    }

    /// Render a template inside a layout
    #[track_caller]
    pub fn html_with_layout(self, status: StatusCode, template: &str, layout: &str) -> Response {
        self.render_html(status, template, Some(layout), CallSite::caller())
    }

    fn render_html(
        self,
        status: StatusCode,
        template: &str,
        layout: Option<&str>,
        site: CallSite,
    ) -> Response {
        let renderer = match self.renderer() {
            Ok(renderer) => renderer,
            Err(missing) => {
                return self.error_html_at(
                    site,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    missing,
                    [Some(missing.to_lowercase())],
                );
            },
        };
        match renderer.render(template, &self.data, layout) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => self.error_html_at(
                site,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error rendering template",
                [Some(e)],
            ),
        }
    }

    /// Write a plain-text body
    #[track_caller]
    pub fn text(self, status: StatusCode, text: impl Into<String>) -> Response {
        if let Err(missing) = self.renderer() {
            return self.error_text_at(
                CallSite::caller(),
                StatusCode::INTERNAL_SERVER_ERROR,
                missing,
                [Some(missing.to_lowercase())],
            );
        }
        text_response(status, text.into())
    }

    /// Serialize a value as the JSON body
    pub fn json<T: Serialize>(self, status: StatusCode, value: &T) -> Response {
        (status, Json(value)).into_response()
    }

    /// Redirect with one of 301, 302, 303, 304 or 401
    ///
    /// Any other status produces an "Invalid Redirect" 500 error page.
    #[track_caller]
    pub fn redirect(self, url: &str, status: StatusCode) -> Response {
        let site = CallSite::caller();
        if !REDIRECT_STATUSES.contains(&status) {
            return self.error_html_at(
                site,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Redirect",
                [None::<String>],
            );
        }
        match HeaderValue::from_str(url) {
            Ok(location) => (status, [(LOCATION, location)]).into_response(),
            Err(e) => self.error_html_at(
                site,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Redirect",
                [Some(e)],
            ),
        }
    }

    /// Write raw bytes with the given content type
    pub fn send_data(self, status: StatusCode, data: impl Into<Bytes>, mime: &str) -> Response {
        payload(status, data.into(), mime, None)
    }

    /// Send bytes as a download
    pub fn file(self, data: impl Into<Bytes>, filename: &str, mime: &str) -> Response {
        payload(
            StatusCode::OK,
            data.into(),
            mime,
            Some(("attachment", filename)),
        )
    }

    /// Send bytes to be displayed by the browser
    pub fn inline_file(self, data: impl Into<Bytes>, filename: &str, mime: &str) -> Response {
        payload(StatusCode::OK, data.into(), mime, Some(("inline", filename)))
    }

    /// Send an Excel workbook as a download
    pub fn excel(self, data: impl Into<Bytes>, filename: &str) -> Response {
        self.file(data, filename, EXCEL_MIME)
    }

    /// Send PDF bytes
    pub fn pdf(self, data: impl Into<Bytes>) -> Response {
        payload(StatusCode::OK, data.into(), PDF_MIME, None)
    }

    /// Render a template and convert it to PDF
    ///
    /// Failures at any step are reported as 500 error pages. The generator
    /// process lives as long as the returned future.
    #[track_caller]
    pub fn template_pdf(
        self,
        template: &str,
        params: &PdfRenderParams,
    ) -> impl Future<Output = Response> + Send + use<> {
        let site = CallSite::caller();
        let template = template.to_string();
        let job = PdfJob::from_params(params);

        async move {
            let renderer = match self.renderer() {
                Ok(renderer) => renderer,
                Err(missing) => {
                    return self.error_html_at(
                        site,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        missing,
                        [Some(missing.to_lowercase())],
                    );
                },
            };

            let html = match renderer.render(&template, &self.data, None) {
                Ok(html) => html,
                Err(e) => {
                    return self.error_html_at(
                        site,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error rendering template",
                        [Some(e)],
                    );
                },
            };

            let Some(generator) = self.state.as_ref().and_then(|s| s.pdf.clone()) else {
                return self.error_html_at(
                    site,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error creating PDF generator",
                    [Some("PDF generator not configured")],
                );
            };

            match generator.generate(&html, &job).await {
                Ok(bytes) => self.pdf(bytes),
                Err(e) => self.error_html_at(
                    site,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error creating PDF",
                    [Some(e)],
                ),
            }
        }
    }

    /// Report a failure in the format the client asked for
    ///
    /// Records the calling file and line only; prefer
    /// [`view_error!`](crate::view_error) in handlers.
    #[track_caller]
    pub fn error<I, E>(self, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        self.error_at(CallSite::caller(), status, friendly, errors)
    }

    /// Report a failure attributed to an explicit call site
    pub fn error_at<I, E>(self, site: CallSite, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        match ErrorFormat::negotiate(&self.accept) {
            ErrorFormat::Html => self.error_html_at(site, status, friendly, errors),
            ErrorFormat::Json => self.error_json_at(site, status, friendly, errors),
            ErrorFormat::Text => self.error_text_at(site, status, friendly, errors),
        }
    }

    /// Report a failure as the `error` template
    #[track_caller]
    pub fn error_html<I, E>(self, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        self.error_html_at(CallSite::caller(), status, friendly, errors)
    }

    /// Report a failure as a JSON body
    #[track_caller]
    pub fn error_json<I, E>(self, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        self.error_json_at(CallSite::caller(), status, friendly, errors)
    }

    /// Report a failure as a plain-text body
    #[track_caller]
    pub fn error_text<I, E>(self, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        self.error_text_at(CallSite::caller(), status, friendly, errors)
    }

    /// Like [`View::error_html`], attributed to an explicit call site
    pub fn error_html_at<I, E>(mut self, site: CallSite, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        let report = reporter::report(friendly, errors, site);

        let renderer = match self.renderer() {
            Ok(renderer) => renderer,
            Err(missing) => {
                warn!(reason = missing, "Cannot render error page, falling back to text");
                return text_response(status, report.nicely_formatted());
            },
        };

        self.add("FriendlyError", &report.friendly)
            .add("NastyError", &report.error)
            .add("LineNumber", &report.line_number)
            .add("FuncName", &report.function_name)
            .add("FileName", &report.file_name)
            .add("ErrorCode", &status.as_u16());

        match renderer.render(ERROR_TEMPLATE, &self.data, None) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!(error = %e, "Error template failed to render");
                text_response(status, report.nicely_formatted())
            },
        }
    }

    /// Like [`View::error_json`], attributed to an explicit call site
    pub fn error_json_at<I, E>(self, site: CallSite, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        let report = reporter::report(friendly, errors, site);
        json_error(status, &report)
    }

    /// Like [`View::error_text`], attributed to an explicit call site
    pub fn error_text_at<I, E>(self, site: CallSite, status: StatusCode, friendly: &str, errors: I) -> Response
    where
        I: IntoIterator<Item = Option<E>>,
        E: ToString,
    {
        let report = reporter::report(friendly, errors, site);
        text_response(status, report.nicely_formatted())
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn text_response(status: StatusCode, body: String) -> Response {
    (status, [(CONTENT_TYPE, TEXT_MIME)], body).into_response()
}

fn json_error(status: StatusCode, report: &ErrorReport) -> Response {
    (status, Json(report)).into_response()
}

fn payload(status: StatusCode, data: Bytes, mime: &str, disposition: Option<(&str, &str)>) -> Response {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(mime) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
        },
        Err(e) => warn!(mime, error = %e, "Invalid content type, sending without one"),
    }
    if let Some((kind, filename)) = disposition {
        let filename = filename.replace('"', "");
        match HeaderValue::from_str(&format!("{kind}; filename=\"{filename}\"")) {
            Ok(value) => {
                headers.insert(CONTENT_DISPOSITION, value);
            },
            Err(e) => warn!(filename, error = %e, "Invalid file name, sending without disposition"),
        }
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(data.len()));
    (status, headers, data).into_response()
}
