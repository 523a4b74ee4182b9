//! Finam client configuration.

use std::time::Duration;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.finam.ru/";

/// Configuration for the Finam HTTP client.
#[derive(Clone)]
pub struct FinamClientConfig {
    /// Long-lived API secret exchanged for session tokens.
    pub secret: String,
    /// REST base URL.
    pub base_url: String,
    /// Per-request transport deadline.
    pub timeout: Duration,
    /// Refresh when the session has this much lifetime left or less.
    pub refresh_margin: Duration,
    /// Assumed session lifetime when the details lookup fails.
    pub fallback_ttl: Duration,
}

impl FinamClientConfig {
    /// Create a configuration for the production endpoint.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            refresh_margin: Duration::from_secs(60),
            fallback_ttl: Duration::from_secs(14 * 60),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the proactive refresh margin.
    #[must_use]
    pub const fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Set the fallback session lifetime.
    #[must_use]
    pub const fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for FinamClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinamClientConfig")
            .field("secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("refresh_margin", &self.refresh_margin)
            .field("fallback_ttl", &self.fallback_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_contract() {
        let config = FinamClientConfig::new("secret");
        assert_eq!(config.base_url, "https://api.finam.ru/");
        assert_eq!(config.refresh_margin, Duration::from_secs(60));
        assert_eq!(config.fallback_ttl, Duration::from_secs(840));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builders_override_defaults() {
        let config = FinamClientConfig::new("secret")
            .with_base_url("http://localhost:9000")
            .with_timeout(Duration::from_secs(5))
            .with_refresh_margin(Duration::from_secs(10))
            .with_fallback_ttl(Duration::from_secs(120));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.refresh_margin, Duration::from_secs(10));
        assert_eq!(config.fallback_ttl, Duration::from_secs(120));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = FinamClientConfig::new("very-secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
