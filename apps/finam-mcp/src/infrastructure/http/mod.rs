//! HTTP Transport
//!
//! Serves MCP frames over HTTP next to health checks and Prometheus metrics.
//!
//! # Endpoints
//!
//! - `POST /mcp` - One JSON-RPC frame per request; `202` for notifications
//! - `GET /health` - JSON health status including the session state
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (fails once shutdown has begun)
//! - `GET /metrics` - Prometheus metrics in text format

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::finam::{FinamApiClient, SessionState};
use crate::infrastructure::mcp::McpServer;
use crate::infrastructure::metrics::get_metrics_handle;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Server version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Finam session state.
    pub session: &'static str,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Session valid or not yet needed.
    Healthy,
    /// Session must be renewed before the next call.
    Degraded,
    /// Shutting down.
    Unhealthy,
}

// =============================================================================
// Server State
// =============================================================================

/// Shared state for the HTTP server.
pub struct HttpServerState {
    version: String,
    started_at: Instant,
    server: Arc<McpServer>,
    client: FinamApiClient,
    cancel: CancellationToken,
}

impl HttpServerState {
    /// Create new server state.
    #[must_use]
    pub fn new(
        version: String,
        server: Arc<McpServer>,
        client: FinamApiClient,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            server,
            client,
            cancel,
        }
    }
}

/// Build the router. Exposed for in-process tests.
pub fn router(state: Arc<HttpServerState>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// HTTP Server
// =============================================================================

/// MCP-over-HTTP server.
pub struct HttpServer {
    host: String,
    port: u16,
    state: Arc<HttpServerState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server.
    #[must_use]
    pub const fn new(
        host: String,
        port: u16,
        state: Arc<HttpServerState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            host,
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let app = router(self.state);

        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(|e| HttpServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(host = %self.host, port = self.port, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn mcp_handler(State(state): State<Arc<HttpServerState>>, body: String) -> Response {
    match state.server.handle_line(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health_handler(State(state): State<Arc<HttpServerState>>) -> impl IntoResponse {
    let health = build_health_response(&state);
    let code = if health.status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(health))
}

async fn liveness_handler() -> &'static str {
    "OK"
}

async fn readiness_handler(State(state): State<Arc<HttpServerState>>) -> impl IntoResponse {
    if state.cancel.is_cancelled() {
        (StatusCode::SERVICE_UNAVAILABLE, "SHUTTING DOWN")
    } else {
        (StatusCode::OK, "READY")
    }
}

async fn metrics_handler() -> Response {
    let Some(handle) = get_metrics_handle() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response();
    };
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
        .into_response()
}

fn build_health_response(state: &HttpServerState) -> HealthResponse {
    let session = state.client.http().session_state();
    HealthResponse {
        status: determine_health_status(session, state.cancel.is_cancelled()),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        session: session.as_str(),
    }
}

const fn determine_health_status(session: SessionState, shutting_down: bool) -> HealthStatus {
    if shutting_down {
        return HealthStatus::Unhealthy;
    }
    match session {
        SessionState::Absent | SessionState::Valid => HealthStatus::Healthy,
        SessionState::NearExpiry | SessionState::Expired => HealthStatus::Degraded,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::finam::FinamClientConfig;
    use crate::infrastructure::mcp::ToolRouter;

    fn state(cancel: CancellationToken) -> Arc<HttpServerState> {
        // Port 9 is discard; nothing in these tests reaches upstream.
        let config = FinamClientConfig::new("secret").with_base_url("http://127.0.0.1:9/");
        let client = FinamApiClient::new(config).unwrap();
        let router = ToolRouter::new(Arc::new(client.clone()), "ACC-1", "http://127.0.0.1:9/");
        let server = Arc::new(McpServer::new(router, "finam-mcp"));
        Arc::new(HttpServerState::new(
            "0.1.0".to_string(),
            server,
            client,
            cancel,
        ))
    }

    fn post_mcp(body: &str) -> Request<Body> {
        Request::post("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn mcp_request_returns_json_rpc_response() {
        let app = router(state(CancellationToken::new()));
        let response = app
            .oneshot(post_mcp(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["result"]["tools"].as_array().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn mcp_notification_is_accepted_without_body() {
        let app = router(state(CancellationToken::new()));
        let response = app
            .oneshot(post_mcp(
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn health_reports_absent_session() {
        let app = router(state(CancellationToken::new()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["session"], SessionState::Absent.as_str());
    }

    #[tokio::test]
    async fn readiness_fails_after_cancel() {
        let cancel = CancellationToken::new();
        let app = router(state(cancel.clone()));
        cancel.cancel();
        let response = app
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn health_status_follows_session() {
        assert_eq!(
            determine_health_status(SessionState::Valid, false),
            HealthStatus::Healthy
        );
        assert_eq!(
            determine_health_status(SessionState::NearExpiry, false),
            HealthStatus::Degraded
        );
        assert_eq!(
            determine_health_status(SessionState::Valid, true),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }
}
