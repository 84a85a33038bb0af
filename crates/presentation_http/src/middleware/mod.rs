//! HTTP middleware components
//!
//! - `access_log`: request id and one log line per request
//! - `gate`: canonical redirect, authentication gate, context enrichment
//! - `context`: building the per-request context bag

pub mod access_log;
pub mod context;
pub mod gate;

pub use access_log::{AccessLogLayer, AccessLogService, REQUEST_ID_HEADER, RequestId};
pub use gate::{GateLayer, GateService, SESSION_COOKIE};
