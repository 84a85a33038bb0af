//! Identity lookup port
//!
//! Resolves request credentials to a logged-in user. The session store
//! behind it is responsible for its own concurrency and caching.

use async_trait::async_trait;
use domain::SessionIdentity;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Raw credentials taken from an inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Value of the `Authorization` header
    pub authorization: Option<String>,
    /// Value of the session cookie
    pub session_cookie: Option<String>,
}

impl Credentials {
    /// Credentials carrying only an `Authorization` header value
    pub fn bearer(value: impl Into<String>) -> Self {
        Self {
            authorization: Some(value.into()),
            session_cookie: None,
        }
    }

    /// Whether the request presented anything at all
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.session_cookie.is_none()
    }
}

/// Identity lookup failures
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The credentials could not even be turned into a lookup
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The session entry does not exist or has expired
    #[error("Session not found or expired: {0}")]
    Expired(String),

    /// The session store failed
    #[error("Identity lookup failed: {0}")]
    Backend(String),
}

/// Port for resolving the caller's identity
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// Resolve the credentials of one request
    ///
    /// Returns `SessionIdentity::Anonymous` when nobody is logged in; errors
    /// are reserved for malformed credentials and lookup failures.
    async fn lookup(&self, credentials: &Credentials) -> Result<SessionIdentity, IdentityError>;
}
