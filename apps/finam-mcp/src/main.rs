//! Finam MCP Binary
//!
//! Starts the MCP tool server over stdio (default) or HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin finam-mcp
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `FINAM_API_TOKEN`: Finam API secret
//! - `FINAM_ACCOUNT_ID`: Account used by account and order tools
//!
//! ## Optional
//! - `FINAM_BASE_URL`: REST base URL (default: <https://api.finam.ru/>)
//! - `FINAM_TIMEOUT_SECS`: Per-request deadline (default: 30)
//! - `FINAM_REFRESH_MARGIN_SECS`: Proactive refresh margin (default: 60)
//! - `FINAM_FALLBACK_TTL_SECS`: Session lifetime when details are unavailable, under 900 (default: 840)
//! - `MCP_TRANSPORT`: stdio | http (default: stdio)
//! - `SERVER_HOST`: HTTP bind host (default: 0.0.0.0)
//! - `SERVER_PORT`: HTTP bind port (default: 8000)
//! - `SERVER_APP_NAME`: Name announced to MCP clients (default: finam-mcp)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use finam_mcp::infrastructure::telemetry;
use finam_mcp::{
    AppConfig, FinamApiClient, HttpServer, HttpServerState, McpServer, ToolRouter, Transport,
    init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Finam MCP server");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder unavailable, metrics disabled");
    }

    let config = AppConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // One client for the whole process so the session survives across calls
    let client = FinamApiClient::new(config.client_config())?;
    let router = ToolRouter::new(
        Arc::new(client.clone()),
        config.credentials.account_id(),
        &config.finam.base_url,
    );
    let server = Arc::new(McpServer::new(router, config.server.app_name.clone()));

    match config.server.transport {
        Transport::Stdio => {
            let stdio_token = shutdown_token.clone();
            let stdio_server = Arc::clone(&server);
            let mut stdio = tokio::spawn(async move { stdio_server.run_stdio(stdio_token).await });

            tokio::select! {
                result = &mut stdio => {
                    shutdown_token.cancel();
                    result??;
                }
                () = await_shutdown(shutdown_token.clone()) => {
                    if let Err(e) = stdio.await {
                        tracing::warn!(error = %e, "stdio task did not stop cleanly");
                    }
                }
            }
        }
        Transport::Http => {
            let state = Arc::new(HttpServerState::new(
                env!("CARGO_PKG_VERSION").to_string(),
                Arc::clone(&server),
                client,
                shutdown_token.clone(),
            ));
            let http_server = HttpServer::new(
                config.server.host.clone(),
                config.server.port,
                state,
                shutdown_token.clone(),
            );
            let mut http = tokio::spawn(http_server.run());

            tokio::select! {
                result = &mut http => {
                    shutdown_token.cancel();
                    result??;
                }
                () = await_shutdown(shutdown_token.clone()) => {
                    if let Err(e) = http.await {
                        tracing::warn!(error = %e, "HTTP task did not stop cleanly");
                    }
                }
            }
        }
    }

    tracing::info!("Finam MCP server stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration. The credential is never logged.
fn log_config(config: &AppConfig) {
    tracing::info!(
        transport = config.server.transport.as_str(),
        account_id = config.credentials.account_id(),
        base_url = %config.finam.base_url,
        "Configuration loaded"
    );
    tracing::debug!(
        timeout_secs = config.finam.timeout.as_secs(),
        refresh_margin_secs = config.finam.refresh_margin.as_secs(),
        fallback_ttl_secs = config.finam.fallback_ttl.as_secs(),
        host = %config.server.host,
        port = config.server.port,
        "Session and server settings"
    );
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
