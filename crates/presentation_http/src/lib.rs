//! Portico HTTP presentation layer
//!
//! Wraps axum routing with per-route access rules, the response `View`,
//! parameter extraction and an authenticated RPC mount.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod params;
pub mod reporter;
pub mod router;
pub mod rpc;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use middleware::{AccessLogLayer, GateLayer, RequestId};
pub use params::Params;
pub use reporter::report;
pub use router::GatewayRouter;
pub use rpc::{RpcAuthLayer, RpcError};
pub use state::AppState;
pub use view::{ErrorFormat, View};

#[doc(hidden)]
pub use domain as __domain;
