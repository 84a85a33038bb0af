//! Route access policy
//!
//! Two separate enumerations are involved when a route is registered:
//! [`RoutePolicy`] decides whether an identity lookup happens at all, and
//! [`AnonymousDisposition`] decides what happens when the lookup succeeds but
//! yields no logged-in user. [`RouteAccess`] pairs them and is fixed at
//! registration time.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Environment;

/// Authentication requirement declared for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutePolicy {
    /// No identity lookup, the handler always runs
    Open,
    /// A logged-in identity is required
    Secure,
    /// Route still under development: open outside production, secure in it
    Todo,
}

impl RoutePolicy {
    /// Whether the handler runs without consulting the identity lookup
    ///
    /// `Todo` only bypasses the lookup outside production.
    #[must_use]
    pub const fn bypasses_lookup(self, environment: Environment) -> bool {
        match self {
            Self::Open => true,
            Self::Secure => false,
            Self::Todo => !environment.is_production(),
        }
    }

    /// Pair this policy with a redirect-to-login disposition
    #[must_use]
    pub const fn redirect_anonymous(self) -> RouteAccess {
        RouteAccess {
            policy: self,
            disposition: AnonymousDisposition::Redirect,
        }
    }

    /// Pair this policy with a 403 disposition
    #[must_use]
    pub const fn disallow_anonymous(self) -> RouteAccess {
        RouteAccess {
            policy: self,
            disposition: AnonymousDisposition::Disallow,
        }
    }
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Secure => write!(f, "SECURE"),
            Self::Todo => write!(f, "TODO"),
        }
    }
}

/// What to do with an anonymous caller on a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymousDisposition {
    /// Fail with 403 "not currently logged in"
    #[default]
    Disallow,
    /// Send a 303 to the login path
    Redirect,
}

/// Access rule attached to a single route registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteAccess {
    /// Authentication requirement
    pub policy: RoutePolicy,
    /// Treatment of anonymous callers
    pub disposition: AnonymousDisposition,
}

impl From<RoutePolicy> for RouteAccess {
    fn from(policy: RoutePolicy) -> Self {
        Self {
            policy,
            disposition: AnonymousDisposition::default(),
        }
    }
}
