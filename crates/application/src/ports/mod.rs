//! Port definitions for application layer
//!
//! Ports are interfaces that define how the gateway talks to its external
//! collaborators. Adapters in the infrastructure layer implement these ports.

mod identity_port;
mod pdf_port;
mod template_port;

#[cfg(test)]
pub use identity_port::MockIdentityPort;
pub use identity_port::{Credentials, IdentityError, IdentityPort};
#[cfg(test)]
pub use pdf_port::MockPdfGeneratorPort;
pub use pdf_port::PdfGeneratorPort;
pub use template_port::{TemplateRenderer, ViewData};
