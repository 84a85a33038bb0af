//! HTTP request handlers owned by the gateway itself

pub mod health;
