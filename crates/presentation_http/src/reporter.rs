//! Error reporter
//!
//! Builds an [`ErrorReport`] attributed to an explicit [`CallSite`] and logs
//! it before any response is written. Views and the gate middleware call
//! [`report`]; nothing else writes error logs for failed requests.

use domain::{CallSite, ErrorReport};
use tracing::error;

/// Build and log a report
///
/// `errors` holds one entry per underlying error; `None` stands for an
/// absent error. With no entries the report is unattributed.
pub fn report<I, E>(friendly: &str, errors: I, site: CallSite) -> ErrorReport
where
    I: IntoIterator<Item = Option<E>>,
    E: ToString,
{
    let report = ErrorReport::new(
        friendly,
        errors.into_iter().map(|e| e.map(|e| e.to_string())),
        site,
    );
    log(&report);
    report
}

/// Log an already built report
pub fn log(report: &ErrorReport) {
    error!(
        friendly = %report.friendly,
        file = %report.file_name,
        line = report.line_number,
        function = %report.function_name,
        "{}",
        report.nicely_formatted()
    );
}
