//! Domain entities

mod error_report;
mod identity;

pub use error_report::{CallSite, ErrorReport, NO_ERROR_SPECIFIED, NOT_SPECIFIED, UNKNOWN_FUNCTION};
pub use identity::{Identity, SessionIdentity};
