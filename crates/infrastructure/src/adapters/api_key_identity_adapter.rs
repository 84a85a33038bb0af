//! API key identity lookup
//!
//! Resolves `Authorization: Bearer <key>` headers against Argon2id hashes
//! from the configuration. Each configured key unlocks one user and,
//! optionally, the site that user belongs to.
//!
//! | Request | Outcome |
//! |---|---|
//! | no `Authorization` header | anonymous |
//! | header without a Bearer token | `IdentityError::InvalidCredentials` |
//! | key matching no hash | `IdentityError::Expired` |
//! | hash that cannot be parsed | `IdentityError::Backend` |
//!
//! # Examples
//!
//! ```
//! use infrastructure::adapters::hash_api_key;
//!
//! let hash = hash_api_key("sk-my-secret-key").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! ```

use std::sync::Arc;

use application::ports::{Credentials, IdentityError, IdentityPort};
use argon2::{
    Argon2, PasswordHash, PasswordHasher as ArgonPasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use domain::{Identity, SessionIdentity, SiteId};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ApiKeyEntry;

const BEARER_PREFIX: &str = "bearer ";

/// Errors that can occur during API key hashing operations
#[derive(Debug, Error)]
pub enum ApiKeyHashError {
    /// Failed to hash the API key
    #[error("Failed to hash API key: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid hash format: {0}")]
    InvalidHashFormat(String),
}

/// Hash an API key with Argon2id, producing a PHC string for the config file
///
/// # Errors
///
/// Returns `ApiKeyHashError::HashingFailed` if hashing fails.
pub fn hash_api_key(api_key: &str) -> Result<String, ApiKeyHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(api_key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiKeyHashError::HashingFailed(e.to_string()))
}

/// Verify an API key against a PHC hash in constant time
///
/// # Errors
///
/// Returns `ApiKeyHashError::InvalidHashFormat` if the hash cannot be parsed.
pub fn verify_api_key(api_key: &str, hash: &str) -> Result<bool, ApiKeyHashError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiKeyHashError::InvalidHashFormat(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(api_key.as_bytes(), &parsed)
        .is_ok())
}

/// A configured key with its identity already resolved
#[derive(Debug, Clone)]
struct KeyEntry {
    hash: String,
    identity: Identity,
}

/// Identity lookup backed by configured API keys
#[derive(Debug, Clone, Default)]
pub struct ApiKeyIdentityAdapter {
    entries: Arc<Vec<KeyEntry>>,
}

impl ApiKeyIdentityAdapter {
    /// Build the adapter from configuration entries
    ///
    /// Plaintext keys and entries with an invalid site are skipped with a
    /// warning.
    #[must_use]
    pub fn from_entries(entries: &[ApiKeyEntry]) -> Self {
        let entries = entries
            .iter()
            .filter_map(|entry| {
                if !entry.is_hashed() {
                    warn!(
                        user_id = %entry.user_id,
                        "Plaintext API key in configuration, skipping entry"
                    );
                    return None;
                }
                let mut identity = Identity::new(entry.user_id.clone());
                if let Some(raw) = entry.site_id.as_deref() {
                    match SiteId::parse(raw) {
                        Ok(site_id) => identity = identity.with_site(site_id),
                        Err(e) => {
                            warn!(
                                user_id = %entry.user_id,
                                error = %e,
                                "Invalid site ID in api_keys configuration, skipping entry"
                            );
                            return None;
                        },
                    }
                }
                Some(KeyEntry {
                    hash: entry.hash.clone(),
                    identity,
                })
            })
            .collect();

        Self {
            entries: Arc::new(entries),
        }
    }

    /// Number of usable keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no usable key is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bearer_token(header: &str) -> Result<&str, IdentityError> {
        let prefix = header.get(..BEARER_PREFIX.len());
        match prefix {
            Some(p) if p.eq_ignore_ascii_case(BEARER_PREFIX) => {
                let token = header[BEARER_PREFIX.len()..].trim();
                if token.is_empty() {
                    Err(IdentityError::InvalidCredentials(
                        "empty Bearer token".to_string(),
                    ))
                } else {
                    Ok(token)
                }
            },
            _ => Err(IdentityError::InvalidCredentials(
                "expected a Bearer token".to_string(),
            )),
        }
    }

    fn find(entries: &[KeyEntry], token: &str) -> Result<Option<Identity>, IdentityError> {
        for entry in entries {
            match verify_api_key(token, &entry.hash) {
                Ok(true) => return Ok(Some(entry.identity.clone())),
                Ok(false) => {},
                Err(e) => return Err(IdentityError::Backend(e.to_string())),
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl IdentityPort for ApiKeyIdentityAdapter {
    #[instrument(skip(self, credentials))]
    async fn lookup(&self, credentials: &Credentials) -> Result<SessionIdentity, IdentityError> {
        let Some(header) = credentials.authorization.as_deref() else {
            return Ok(SessionIdentity::Anonymous);
        };
        let token = Self::bearer_token(header)?.to_string();

        // Argon2 verification is deliberately slow
        let entries = Arc::clone(&self.entries);
        let found = tokio::task::spawn_blocking(move || Self::find(&entries, &token))
            .await
            .map_err(|e| IdentityError::Backend(format!("verification task failed: {e}")))??;

        match found {
            Some(identity) => {
                debug!(user_id = %identity.user_id, "API key verified");
                Ok(SessionIdentity::Authenticated(identity))
            },
            None => Err(IdentityError::Expired("unknown API key".to_string())),
        }
    }
}
