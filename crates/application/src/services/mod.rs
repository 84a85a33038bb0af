//! Application services
//!
//! Request policy evaluated before any handler runs.

pub mod auth_gate;
pub mod canonical;

pub use auth_gate::{
    AUTH_FAILURE, AuthGate, GateDecision, GateRejection, LOGIN_EXPIRED, NOT_LOGGED_IN,
    RPC_NOT_LOGGED_IN, RpcDecision,
};
pub use canonical::{RequestTarget, canonical_redirect};
