//! Finam Trade API Adapter
//!
//! Implementation of `FinamApiPort` over the Finam REST API with:
//! - Credential-to-session exchange and proactive token refresh
//! - One re-authentication and retry on an unauthorized response
//! - Uniform classification of upstream, transport and schema errors

mod adapter;
mod config;
mod error;
mod http_client;
mod request;
mod session;

pub use adapter::FinamApiClient;
pub use config::{DEFAULT_BASE_URL, FinamClientConfig};
pub use http_client::FinamHttpClient;
pub use request::ApiRequest;
pub use session::{ExpirySource, SessionState, SessionToken, TokenStore};
