//! Server Configuration Settings
//!
//! Configuration types for the MCP server, loaded from environment variables.

use std::time::Duration;

use crate::infrastructure::finam::{DEFAULT_BASE_URL, FinamClientConfig};

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl Transport {
    /// Parse transport from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            "http" | "streamable-http" => Some(Self::Http),
            _ => None,
        }
    }

    /// Get the transport name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// Finam API credentials.
#[derive(Clone)]
pub struct Credentials {
    api_token: String,
    account_id: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_token: String, account_id: String) -> Self {
        Self {
            api_token,
            account_id,
        }
    }

    /// Get the long-lived API token.
    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Get the account id used by account-scoped tools.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Finam upstream settings.
#[derive(Debug, Clone)]
pub struct FinamSettings {
    /// REST base URL.
    pub base_url: String,
    /// Per-request transport deadline.
    pub timeout: Duration,
    /// Proactive refresh margin.
    pub refresh_margin: Duration,
    /// Session lifetime assumed when the details lookup fails.
    pub fallback_ttl: Duration,
}

impl Default for FinamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            refresh_margin: Duration::from_secs(60),
            fallback_ttl: Duration::from_secs(14 * 60),
        }
    }
}

/// MCP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Transport selection.
    pub transport: Transport,
    /// HTTP bind host.
    pub host: String,
    /// HTTP bind port.
    pub port: u16,
    /// Name announced in `serverInfo`.
    pub app_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: "0.0.0.0".to_string(),
            port: 8000,
            app_name: "finam-mcp".to_string(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Upstream settings.
    pub finam: FinamSettings,
    /// Server settings.
    pub server: ServerSettings,
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// empty, the transport is unknown, or the fallback session lifetime is
    /// not between the refresh margin and the server's session lifetime.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = required(&lookup, "FINAM_API_TOKEN")?;
        let account_id = required(&lookup, "FINAM_ACCOUNT_ID")?;

        let finam_defaults = FinamSettings::default();
        let finam = FinamSettings {
            base_url: lookup("FINAM_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(finam_defaults.base_url),
            timeout: parse_duration_secs(&lookup, "FINAM_TIMEOUT_SECS", finam_defaults.timeout),
            refresh_margin: parse_duration_secs(
                &lookup,
                "FINAM_REFRESH_MARGIN_SECS",
                finam_defaults.refresh_margin,
            ),
            fallback_ttl: parse_duration_secs(
                &lookup,
                "FINAM_FALLBACK_TTL_SECS",
                finam_defaults.fallback_ttl,
            ),
        };
        check_fallback_ttl(&finam)?;

        let server_defaults = ServerSettings::default();
        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => Transport::from_str_case_insensitive(&raw).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "MCP_TRANSPORT".to_string(),
                    value: raw.clone(),
                    expected: "stdio or http".to_string(),
                }
            })?,
            None => server_defaults.transport,
        };
        let server = ServerSettings {
            transport,
            host: lookup("SERVER_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(server_defaults.host),
            port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(server_defaults.port),
            app_name: lookup("SERVER_APP_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(server_defaults.app_name),
        };

        Ok(Self {
            credentials: Credentials::new(api_token, account_id),
            finam,
            server,
        })
    }

    /// Client configuration for the Finam adapter.
    #[must_use]
    pub fn client_config(&self) -> FinamClientConfig {
        FinamClientConfig::new(self.credentials.api_token())
            .with_base_url(self.finam.base_url.clone())
            .with_timeout(self.finam.timeout)
            .with_refresh_margin(self.finam.refresh_margin)
            .with_fallback_ttl(self.finam.fallback_ttl)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has a value outside its domain.
    #[error("environment variable {key} has invalid value {value:?}, expected {expected}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: String,
    },
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

/// Server-side session lifetime the fallback must stay under.
const SESSION_LIFETIME: Duration = Duration::from_secs(15 * 60);

fn check_fallback_ttl(finam: &FinamSettings) -> Result<(), ConfigError> {
    let ttl = finam.fallback_ttl;
    if ttl > finam.refresh_margin && ttl < SESSION_LIFETIME {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        key: "FINAM_FALLBACK_TTL_SECS".to_string(),
        value: ttl.as_secs().to_string(),
        expected: format!(
            "more than the refresh margin ({}s) and less than {}s",
            finam.refresh_margin.as_secs(),
            SESSION_LIFETIME.as_secs()
        ),
    })
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("FINAM_API_TOKEN", "secret"), ("FINAM_ACCOUNT_ID", "A1")];

    #[test]
    fn defaults_apply_when_only_required_set() {
        let config = config_from(&REQUIRED).unwrap();
        assert_eq!(config.credentials.account_id(), "A1");
        assert_eq!(config.finam.base_url, "https://api.finam.ru/");
        assert_eq!(config.finam.timeout, Duration::from_secs(30));
        assert_eq!(config.finam.refresh_margin, Duration::from_secs(60));
        assert_eq!(config.finam.fallback_ttl, Duration::from_secs(840));
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.app_name, "finam-mcp");
    }

    #[test]
    fn missing_token_is_reported() {
        let err = config_from(&[("FINAM_ACCOUNT_ID", "A1")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "FINAM_API_TOKEN"));
    }

    #[test]
    fn empty_account_is_reported() {
        let err = config_from(&[("FINAM_API_TOKEN", "secret"), ("FINAM_ACCOUNT_ID", " ")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(key) if key == "FINAM_ACCOUNT_ID"));
    }

    #[test]
    fn unknown_transport_is_invalid() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MCP_TRANSPORT", "websocket"));
        let err = config_from(&pairs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MCP_TRANSPORT"));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("SERVER_PORT", "eighty"), ("FINAM_TIMEOUT_SECS", "-1")]);
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.finam.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_flow_into_client_config() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("FINAM_BASE_URL", "http://localhost:9999"),
            ("FINAM_REFRESH_MARGIN_SECS", "30"),
            ("FINAM_FALLBACK_TTL_SECS", "300"),
        ]);
        let client = config_from(&pairs).unwrap().client_config();
        assert_eq!(client.secret, "secret");
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.refresh_margin, Duration::from_secs(30));
        assert_eq!(client.fallback_ttl, Duration::from_secs(300));
    }

    #[test_case("900", "60" ; "equal to session lifetime")]
    #[test_case("3600", "60" ; "longer than session lifetime")]
    #[test_case("60", "60" ; "equal to refresh margin")]
    #[test_case("30", "60" ; "inside refresh margin")]
    #[test_case("120", "300" ; "inside widened margin")]
    fn out_of_range_fallback_ttl_is_invalid(ttl: &str, margin: &str) {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("FINAM_FALLBACK_TTL_SECS", ttl),
            ("FINAM_REFRESH_MARGIN_SECS", margin),
        ]);
        let err = config_from(&pairs).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, ref value, .. } if key == "FINAM_FALLBACK_TTL_SECS" && value == ttl)
        );
    }

    #[test]
    fn fallback_ttl_just_under_session_lifetime_is_accepted() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FINAM_FALLBACK_TTL_SECS", "899"));
        let config = config_from(&pairs).unwrap();
        assert_eq!(config.finam.fallback_ttl, Duration::from_secs(899));
        assert!(config.finam.fallback_ttl < SESSION_LIFETIME);
    }

    #[test_case("stdio", Some(Transport::Stdio) ; "stdio")]
    #[test_case("HTTP", Some(Transport::Http) ; "upper http")]
    #[test_case("streamable-http", Some(Transport::Http) ; "streamable alias")]
    #[test_case("sse", None ; "unsupported")]
    fn transport_parsing(input: &str, expected: Option<Transport>) {
        assert_eq!(Transport::from_str_case_insensitive(input), expected);
    }

    #[test]
    fn credentials_redacted_debug() {
        let creds = Credentials::new("token123".to_string(), "A1".to_string());
        let debug = format!("{creds:?}");
        assert!(!debug.contains("token123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
