//! HTTP client with session token management.
//!
//! Every authenticated call first ensures a VALID session, refreshing it
//! when it is absent, expired or inside the refresh margin. A 401 on an
//! authenticated call drops the session, re-authenticates once and retries
//! the call once; a second 401 is surfaced as `AuthorizationFailed`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::config::FinamClientConfig;
use super::error::{decode, session_error, transport_error, upstream_error};
use super::request::ApiRequest;
use super::session::{SessionState, SessionToken, TokenStore};
use crate::application::dto::{AuthResponse, TokenDetails};
use crate::application::ports::{ApiError, ErrorBody};
use crate::infrastructure::metrics::{
    RefreshReason, record_details_fallback, record_session_refresh, record_upstream_request,
};

const SESSIONS_PATH: &str = "/v1/sessions";
const SESSION_DETAILS_PATH: &str = "/v1/sessions/details";

/// Outcome of the token details lookup.
enum DetailsLookup {
    Found(TokenDetails),
    Unavailable(ApiError),
}

/// HTTP client for the Finam REST API.
pub struct FinamHttpClient {
    client: Client,
    base_url: Url,
    config: FinamClientConfig,
    session: TokenStore,
    refresh_lock: Mutex<()>,
}

impl FinamHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// No network traffic happens until the first call.
    pub fn new(config: FinamClientConfig) -> Result<Self, ApiError> {
        if config.secret.trim().is_empty() {
            return Err(ApiError::validation("secret", "API secret is empty"));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::validation("base_url", e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::validation(
                "base_url",
                format!("{} cannot carry a path", config.base_url),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("finam-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| transport_error(&e))?;

        Ok(Self {
            client,
            base_url,
            config,
            session: TokenStore::new(),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Current session state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session.state_at(Utc::now(), self.config.refresh_margin)
    }

    /// Accounts reachable with the current session, when its details are known.
    #[must_use]
    pub fn session_account_ids(&self) -> Vec<String> {
        self.session
            .current()
            .map(|s| s.account_ids().to_vec())
            .unwrap_or_default()
    }

    /// Expiry of the held session, if any.
    #[must_use]
    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.current().map(|s| s.expires_at())
    }

    /// Exchange the credential for a fresh session token.
    ///
    /// Replaces any held session. Fails with `CredentialRejected` when the
    /// server refuses the credential.
    pub async fn authenticate(&self) -> Result<AuthResponse, ApiError> {
        let _guard = self.refresh_lock.lock().await;
        let session = self.acquire_session().await?;
        Ok(AuthResponse {
            token: session.token().to_string(),
        })
    }

    /// Make sure a VALID session is held, refreshing it if needed.
    pub async fn ensure_valid_session(&self) -> Result<(), ApiError> {
        self.valid_token().await.map(|_| ())
    }

    /// Perform a request and decode its JSON response.
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let started = Instant::now();
        let result = self
            .execute(request)
            .await
            .and_then(|body| decode(&request.describe(), &body));

        let outcome = result.as_ref().map_or_else(ApiError::kind, |_| "success");
        record_upstream_request(&request.endpoint(), outcome, started.elapsed());

        result
    }

    // =========================================================================
    // Session handling
    // =========================================================================

    async fn valid_token(&self) -> Result<String, ApiError> {
        let margin = self.config.refresh_margin;
        if let Some(token) = self.session.usable_token(Utc::now(), margin) {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        let now = Utc::now();
        if let Some(token) = self.session.usable_token(now, margin) {
            return Ok(token);
        }

        let state = self.session.state_at(now, margin);
        let reason = if state == SessionState::Absent {
            RefreshReason::Initial
        } else {
            RefreshReason::NearExpiry
        };
        tracing::info!(state = state.as_str(), "Acquiring session token");
        record_session_refresh(reason);

        let session = self.acquire_session().await?;
        Ok(session.token().to_string())
    }

    async fn reauthenticate(&self, rejected: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if !self.session.invalidate(rejected)
            && let Some(token) = self
                .session
                .usable_token(Utc::now(), self.config.refresh_margin)
        {
            return Ok(token);
        }

        tracing::warn!("Session token rejected, re-authenticating");
        record_session_refresh(RefreshReason::Unauthorized);

        let session = self.acquire_session().await?;
        Ok(session.token().to_string())
    }

    /// Create a session and resolve its expiry. Caller holds `refresh_lock`.
    async fn acquire_session(&self) -> Result<SessionToken, ApiError> {
        let request = ApiRequest::post(SESSIONS_PATH)
            .unauthenticated()
            .json(&serde_json::json!({ "secret": self.config.secret }))?;

        let started = Instant::now();
        let auth = self.create_session(&request).await;
        let outcome = auth.as_ref().map_or_else(ApiError::kind, |_| "success");
        record_upstream_request(&request.endpoint(), outcome, started.elapsed());
        let auth = auth?;

        let session = match self.lookup_details(&auth.token).await {
            DetailsLookup::Found(details) => {
                tracing::info!(
                    expires_at = %details.expires_at,
                    accounts = details.account_ids.len(),
                    readonly = details.readonly,
                    "Session established"
                );
                SessionToken::from_details(auth.token, &details)
            }
            DetailsLookup::Unavailable(err) => {
                tracing::warn!(
                    error = %err,
                    kind = err.kind(),
                    fallback_secs = self.config.fallback_ttl.as_secs(),
                    "Token details unavailable, assuming fallback lifetime"
                );
                record_details_fallback();
                SessionToken::with_fallback(auth.token, Utc::now(), self.config.fallback_ttl)
            }
        };

        self.session.replace(session.clone());
        Ok(session)
    }

    async fn create_session(&self, request: &ApiRequest) -> Result<AuthResponse, ApiError> {
        let response = self.send(request, None).await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Session creation refused");
            return Err(session_error(status, &body));
        }
        decode(&request.describe(), &body)
    }

    async fn lookup_details(&self, token: &str) -> DetailsLookup {
        let started = Instant::now();
        let result = self.fetch_details(token).await;
        let outcome = result.as_ref().map_or_else(ApiError::kind, |_| "success");
        record_upstream_request(
            &format!("POST {SESSION_DETAILS_PATH}"),
            outcome,
            started.elapsed(),
        );

        match result {
            Ok(details) => DetailsLookup::Found(details),
            Err(err) => DetailsLookup::Unavailable(err),
        }
    }

    async fn fetch_details(&self, token: &str) -> Result<TokenDetails, ApiError> {
        let request = ApiRequest::post(SESSION_DETAILS_PATH)
            .unauthenticated()
            .json(&serde_json::json!({ "token": token }))?;
        let body = self.send_checked(&request, None).await?;
        decode(&request.describe(), &body)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn execute(&self, request: &ApiRequest) -> Result<String, ApiError> {
        if !request.requires_auth() {
            return self.send_checked(request, None).await;
        }

        let token = self.valid_token().await?;
        let response = self.send(request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let token = self.reauthenticate(&token).await?;
        let response = self.send(request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let (_, body) = read_body(response).await?;
        self.session.invalidate(&token);
        tracing::error!(
            request = %request.describe(),
            "Request unauthorized after re-authentication"
        );
        Err(ApiError::AuthorizationFailed {
            body: ErrorBody::from_raw(&body),
        })
    }

    async fn send_checked(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<String, ApiError> {
        let response = self.send(request, token).await?;
        check_status(response).await
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let url = self.url_for(request)?;
        tracing::debug!(request = %request.describe(), "Sending Finam request");

        let mut builder = self.client.request(request.method().clone(), url);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }

        builder.send().await.map_err(|e| {
            tracing::warn!(request = %request.describe(), error = %e, "Finam request failed");
            transport_error(&e)
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::validation("base_url", "cannot carry a path"))?
            .pop_if_empty()
            .extend(request.segments());
        Ok(url)
    }
}

impl std::fmt::Debug for FinamHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinamHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, String), ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(&e))?;
    Ok((status, body))
}

async fn check_status(response: Response) -> Result<String, ApiError> {
    let (status, body) = read_body(response).await?;
    if status.is_success() {
        Ok(body)
    } else {
        tracing::warn!(status = status.as_u16(), "Finam API returned an error");
        Err(upstream_error(status, &body))
    }
}
