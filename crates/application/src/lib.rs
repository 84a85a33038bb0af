//! Application layer - Request policy and port definitions
//!
//! Contains the canonical-host and authentication policies, the request
//! context handed to handlers, and the ports implemented by infrastructure
//! adapters.

pub mod error;
pub mod ports;
pub mod request_context;
pub mod services;
pub mod settings;

pub use error::ApplicationError;
pub use ports::*;
pub use request_context::{RequestContext, RequestContextBuilder, RpcContext};
pub use services::*;
pub use settings::GatewaySettings;
