//! Session token state.
//!
//! A session is ABSENT until the first authentication, then VALID,
//! NEAR_EXPIRY once its remaining lifetime falls within the refresh margin,
//! and EXPIRED once it is past its expiry. Only VALID tokens are sent.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::application::dto::TokenDetails;

/// Lifecycle state of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token acquired yet, or the last one was rejected.
    Absent,
    /// Token usable with lifetime to spare.
    Valid,
    /// Token within the refresh margin of expiry.
    NearExpiry,
    /// Token past its expiry.
    Expired,
}

impl SessionState {
    /// Label for logs and health output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Valid => "valid",
            Self::NearExpiry => "near_expiry",
            Self::Expired => "expired",
        }
    }
}

/// Where a session's expiry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySource {
    /// Reported by the token details endpoint.
    Details,
    /// Assumed after the details lookup failed.
    Fallback,
}

/// An acquired session token.
#[derive(Clone)]
pub struct SessionToken {
    token: String,
    expires_at: DateTime<Utc>,
    source: ExpirySource,
    account_ids: Vec<String>,
}

impl SessionToken {
    /// Token with the expiry reported by the details endpoint.
    #[must_use]
    pub fn from_details(token: String, details: &TokenDetails) -> Self {
        Self {
            token,
            expires_at: details.expires_at,
            source: ExpirySource::Details,
            account_ids: details.account_id_strings(),
        }
    }

    /// Token with an assumed lifetime.
    #[must_use]
    pub fn with_fallback(token: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            token,
            expires_at: now + ttl,
            source: ExpirySource::Fallback,
            account_ids: Vec::new(),
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Where the expiry came from.
    #[must_use]
    pub const fn source(&self) -> ExpirySource {
        self.source
    }

    /// Accounts reachable with this token.
    #[must_use]
    pub fn account_ids(&self) -> &[String] {
        &self.account_ids
    }

    /// State at `now` given the refresh margin.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>, margin: Duration) -> SessionState {
        let remaining = self.expires_at - now;
        if remaining <= chrono::Duration::zero() {
            return SessionState::Expired;
        }
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        if remaining <= margin {
            SessionState::NearExpiry
        } else {
            SessionState::Valid
        }
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .field("account_ids", &self.account_ids)
            .finish()
    }
}

/// Shared holder of the current session.
#[derive(Debug, Default)]
pub struct TokenStore {
    current: RwLock<Option<SessionToken>>,
}

impl TokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the held session at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>, margin: Duration) -> SessionState {
        self.current
            .read()
            .as_ref()
            .map_or(SessionState::Absent, |s| s.state_at(now, margin))
    }

    /// Token value if the session is VALID at `now`.
    #[must_use]
    pub fn usable_token(&self, now: DateTime<Utc>, margin: Duration) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .filter(|s| s.state_at(now, margin) == SessionState::Valid)
            .map(|s| s.token.clone())
    }

    /// Snapshot of the held session.
    #[must_use]
    pub fn current(&self) -> Option<SessionToken> {
        self.current.read().clone()
    }

    /// Install a freshly acquired session.
    pub fn replace(&self, session: SessionToken) {
        *self.current.write() = Some(session);
    }

    /// Drop the session if it still holds `rejected`. Returns whether it did.
    pub fn invalidate(&self, rejected: &str) -> bool {
        let mut current = self.current.write();
        if current.as_ref().is_some_and(|s| s.token == rejected) {
            *current = None;
            true
        } else {
            false
        }
    }
}
