//! Session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response from `POST /v1/sessions`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Short-lived session token.
    pub token: String,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Response from `POST /v1/sessions/details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Issuance instant.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Market data permissions.
    #[serde(default)]
    pub md_permissions: Vec<serde_json::Value>,
    /// Accounts reachable with this token.
    #[serde(default)]
    pub account_ids: Vec<serde_json::Value>,
    /// Whether the token is read-only.
    #[serde(default)]
    pub readonly: bool,
}

impl TokenDetails {
    /// Account ids as strings, whatever JSON type the API used.
    #[must_use]
    pub fn account_id_strings(&self) -> Vec<String> {
        self.account_ids
            .iter()
            .map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
