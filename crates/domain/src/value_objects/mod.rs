//! Value Objects - Immutable, identity-less domain primitives

mod environment;
pub mod params;
mod pdf;
mod route_policy;
mod site_id;

pub use environment::Environment;
pub use pdf::{
    DEFAULT_JAVASCRIPT_DELAY_MS, Orientation, PDF_DPI, PageSize, PdfJob, PdfRenderParams,
    ReadySignal,
};
pub use route_policy::{AnonymousDisposition, RouteAccess, RoutePolicy};
pub use site_id::SiteId;
