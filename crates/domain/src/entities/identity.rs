//! Session identity resolved by the identity lookup

use serde::{Deserialize, Serialize};

use crate::value_objects::SiteId;

/// A logged-in caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user identifier issued by the session store
    pub user_id: String,
    /// Site the user belongs to, when the session store knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
}

impl Identity {
    /// Create an identity without a site
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            site_id: None,
        }
    }

    /// Attach the user's site
    #[must_use]
    pub const fn with_site(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }
}

/// Outcome of a successful identity lookup
///
/// Lookup failures are errors, not variants of this type. Produced fresh for
/// every request and never cached beyond it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdentity {
    /// The caller is logged in
    Authenticated(Identity),
    /// The lookup worked but nobody is logged in
    Anonymous,
}

impl SessionIdentity {
    /// The resolved identity, if any
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous => None,
        }
    }

    /// Whether a user is logged in
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
