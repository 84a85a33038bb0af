//! Site identifier value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::errors::DomainError;

/// Identifier of the site a request is served for
///
/// Site identifiers are ULIDs: 26 Crockford base32 characters that sort
/// lexicographically by creation time. Parsing is case-insensitive and the
/// canonical form is upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(Ulid);

impl SiteId {
    /// Create a new site ID for the current instant
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Wrap an existing ULID
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Parse a site ID, accepting lower-case input
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Ulid::from_string(&s.trim().to_uppercase())
            .map(Self)
            .map_err(|e| DomainError::InvalidSiteId(format!("{s}: {e}")))
    }

    /// Get the underlying ULID
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
