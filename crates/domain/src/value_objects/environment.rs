//! Deployment environment

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Application environment (development or production)
///
/// Production turns on canonical-host enforcement and makes `Todo`
/// routes behave as `Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    #[serde(alias = "dev")]
    Development,
    /// Production environment
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    /// Check whether this is the production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check whether this is the development environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(DomainError::InvalidEnvironment(s.to_string())),
        }
    }
}
