//! Error reports and call-site attribution
//!
//! An [`ErrorReport`] pairs the message shown to a person with the technical
//! detail behind it and the source location of the code that decided to
//! report. The location is passed in explicitly as a [`CallSite`], captured
//! with [`call_site!`](crate::call_site) or [`CallSite::caller`], so that
//! wrapping the reporter in more layers never shifts the attribution.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Technical detail used when no underlying error is supplied
pub const NO_ERROR_SPECIFIED: &str = "No Error Specified";

/// File and function placeholder used when no underlying error is supplied
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Function name recorded when only the file and line are known
pub const UNKNOWN_FUNCTION: &str = "unknown";

/// Source location of the code that reported a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    function: &'static str,
}

impl CallSite {
    /// Build a call site from its parts
    ///
    /// Trailing `::{{closure}}` segments, produced for async bodies, are
    /// removed from the function path.
    #[must_use]
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        let mut function = function;
        while let Some(stripped) = function.strip_suffix("::{{closure}}") {
            function = stripped;
        }
        Self {
            file,
            line,
            function,
        }
    }

    /// Capture the location of the caller of the `#[track_caller]` chain
    ///
    /// The function name is not available this way and is recorded as
    /// [`UNKNOWN_FUNCTION`].
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), UNKNOWN_FUNCTION)
    }

    /// Source file path
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Line number
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Fully qualified enclosing function
    #[must_use]
    pub const fn function(&self) -> &'static str {
        self.function
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Capture the current file, line and enclosing function as a [`CallSite`]
///
/// ```
/// use domain::call_site;
///
/// fn load_invoice() -> domain::CallSite {
///     call_site!()
/// }
///
/// let site = load_invoice();
/// assert!(site.function().ends_with("load_invoice"));
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        $crate::entities::CallSite::new(
            file!(),
            line!(),
            name.strip_suffix("::__here").unwrap_or(name),
        )
    }};
}

/// A reported failure
///
/// Serialized with the field names callers parse:
/// `{Friendly, Error, LineNumber, FunctionName, FileName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorReport {
    /// Message meant for a person
    pub friendly: String,
    /// Underlying error messages, newline separated
    pub error: String,
    /// Line of the reporting code, `-1` when unknown
    pub line_number: i64,
    /// Enclosing function of the reporting code
    pub function_name: String,
    /// Source file of the reporting code
    pub file_name: String,
}

impl ErrorReport {
    /// Build a report from a friendly message and zero or more underlying errors
    ///
    /// Each entry of `errors` is one underlying error message; `None` entries
    /// stand for an absent error and contribute [`NO_ERROR_SPECIFIED`]. With
    /// no entries at all, the technical detail and the source attribution are
    /// sentinels and `site` is ignored.
    pub fn new<I, S>(friendly: impl Into<String>, errors: I, site: CallSite) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let messages: Vec<String> = errors
            .into_iter()
            .map(|e| e.map_or_else(|| NO_ERROR_SPECIFIED.to_string(), Into::into))
            .collect();

        if messages.is_empty() {
            return Self::unattributed(friendly);
        }

        Self {
            friendly: friendly.into(),
            error: messages.join("\n"),
            line_number: i64::from(site.line()),
            function_name: site.function().to_string(),
            file_name: site.file().to_string(),
        }
    }

    /// Build a report that carries no technical detail
    pub fn unattributed(friendly: impl Into<String>) -> Self {
        Self {
            friendly: friendly.into(),
            error: NO_ERROR_SPECIFIED.to_string(),
            line_number: -1,
            function_name: NOT_SPECIFIED.to_string(),
            file_name: NOT_SPECIFIED.to_string(),
        }
    }

    /// Multi-line human readable rendering used for logs and plain-text bodies
    #[must_use]
    pub fn nicely_formatted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Friendly Message: \n\t{}", self.friendly)?;
        writeln!(f, "Error: \n\t{}", self.error)?;
        writeln!(f, "File: \n\t{}:{}", self.file_name, self.line_number)?;
        writeln!(f, "FunctionName: \n\t{}", self.function_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> CallSite {
        CallSite::new("src/handlers/invoice.rs", 42, "app::handlers::invoice::show")
    }

    #[test]
    fn zero_errors_use_sentinels() {
        let report = ErrorReport::new("Something broke", Vec::<Option<String>>::new(), site());
        assert_eq!(report.friendly, "Something broke");
        assert_eq!(report.error, NO_ERROR_SPECIFIED);
        assert_eq!(report.line_number, -1);
        assert_eq!(report.file_name, NOT_SPECIFIED);
        assert_eq!(report.function_name, NOT_SPECIFIED);
    }

    #[test]
    fn two_errors_join_with_newline_in_order() {
        let report = ErrorReport::new("Oops", [Some("E1"), Some("E2")], site());
        assert_eq!(report.error, "E1\nE2");
    }

    #[test]
    fn errors_attribute_to_call_site() {
        let report = ErrorReport::new("Oops", [Some("boom")], site());
        assert_eq!(report.line_number, 42);
        assert_eq!(report.file_name, "src/handlers/invoice.rs");
        assert_eq!(report.function_name, "app::handlers::invoice::show");
    }

    #[test]
    fn absent_error_in_list_is_named() {
        let report = ErrorReport::new("Oops", [Some("E1"), None], site());
        assert_eq!(report.error, format!("E1\n{NO_ERROR_SPECIFIED}"));
        assert_eq!(report.line_number, 42);
    }

    #[test]
    fn json_uses_pascal_case_fields() {
        let report = ErrorReport::new("Oops", [Some("boom")], site());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Friendly"], "Oops");
        assert_eq!(json["Error"], "boom");
        assert_eq!(json["LineNumber"], 42);
        assert_eq!(json["FunctionName"], "app::handlers::invoice::show");
        assert_eq!(json["FileName"], "src/handlers/invoice.rs");
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let report = ErrorReport::new("Oops", [Some("a"), Some("b")], site());
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ErrorReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn nicely_formatted_has_all_sections() {
        let text = ErrorReport::new("Oops", [Some("boom")], site()).nicely_formatted();
        assert!(text.contains("Friendly Message: \n\tOops"));
        assert!(text.contains("Error: \n\tboom"));
        assert!(text.contains("File: \n\tsrc/handlers/invoice.rs:42"));
        assert!(text.contains("FunctionName: \n\tapp::handlers::invoice::show"));
    }

    #[test]
    fn call_site_macro_names_enclosing_function() {
        fn reporting_function() -> CallSite {
            crate::call_site!()
        }
        let site = reporting_function();
        assert!(site.function().ends_with("reporting_function"));
        assert!(site.file().ends_with("error_report.rs"));
        assert!(site.line() > 0);
    }

    #[test]
    fn closure_suffixes_are_trimmed() {
        let site = CallSite::new("a.rs", 1, "app::handler::{{closure}}::{{closure}}");
        assert_eq!(site.function(), "app::handler");
    }

    #[test]
    fn caller_records_this_file() {
        let site = CallSite::caller();
        assert!(site.file().ends_with("error_report.rs"));
        assert_eq!(site.function(), UNKNOWN_FUNCTION);
    }
}
