//! Security configuration: API keys.

use serde::{Deserialize, Serialize};

/// Configuration for a hashed API key with the identity it unlocks
///
/// API keys must be pre-hashed using Argon2id format (PHC string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    /// Argon2id hash of the API key in PHC format
    /// Example: "$argon2id$v=19$m=19456,t=2,p=1$..."
    pub hash: String,

    /// User ID associated with this API key
    pub user_id: String,

    /// Site the user belongs to, as a ULID
    #[serde(default)]
    pub site_id: Option<String>,
}

impl ApiKeyEntry {
    /// Whether `hash` is an Argon2 PHC string rather than a plaintext key
    ///
    /// Plaintext entries never match.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.hash.starts_with("$argon2")
    }
}

/// Security configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Hashed API keys accepted as bearer tokens
    ///
    /// Example in config.toml:
    /// ```toml
    /// [[security.api_keys]]
    /// hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// user_id = "alice"
    /// site_id = "01ARZ3NDEKTSV4RRFFQ69G5FAV"
    /// ```
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> ApiKeyEntry {
        ApiKeyEntry {
            hash: hash.to_string(),
            user_id: "alice".to_string(),
            site_id: None,
        }
    }

    #[test]
    fn detects_plaintext_keys() {
        assert!(entry("$argon2id$v=19$m=19456,t=2,p=1$abc$def").is_hashed());
        assert!(!entry("secret").is_hashed());
    }

    #[test]
    fn default_has_no_keys() {
        assert!(SecurityConfig::default().api_keys.is_empty());
    }
}
