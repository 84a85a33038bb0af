//! Domain layer for Portico
//!
//! Contains the request gateway's vocabulary: route policies, environments,
//! identities, error reports and the PDF job description. This layer
//! performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
