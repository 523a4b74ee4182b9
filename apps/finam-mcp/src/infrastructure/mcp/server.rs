//! MCP server.
//!
//! Line-delimited JSON-RPC over any async reader/writer pair. Each input
//! line is one request or notification; each response is one output line.
//! The HTTP transport reuses [`McpServer::handle_line`] for single frames.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio_util::sync::CancellationToken;

use super::catalog::tool_catalog;
use super::protocol::{ErrorCode, JsonRpcRequest, JsonRpcResponse};
use super::tools::ToolRouter;

/// MCP protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC front end over a [`ToolRouter`].
#[derive(Debug)]
pub struct McpServer {
    router: ToolRouter,
    server_name: String,
}

impl McpServer {
    /// Create a server announcing itself as `server_name`.
    #[must_use]
    pub fn new(router: ToolRouter, server_name: impl Into<String>) -> Self {
        Self {
            router,
            server_name: server_name.into(),
        }
    }

    /// Underlying tool router.
    #[must_use]
    pub const fn router(&self) -> &ToolRouter {
        &self.router
    }

    /// Handle one frame. `None` means no response is owed.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable frame");
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError,
                    "Parse error",
                ))
            }
        }
    }

    /// Handle one already-parsed frame.
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        if !value.is_object() {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::InvalidRequest,
                "Invalid Request",
            ));
        }

        let fallback_id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    fallback_id,
                    ErrorCode::InvalidRequest,
                    format!("Invalid Request: {e}"),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                request.id.unwrap_or(Value::Null),
                ErrorCode::InvalidRequest,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        if method.starts_with("notifications/") {
            tracing::debug!(method, "Notification received");
            return None;
        }

        let Some(id) = id else {
            tracing::debug!(method, "Ignoring request without id");
            return None;
        };

        let response = match method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_catalog() })),
            "tools/call" => self.call_tool(id, params).await,
            other => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound,
                format!("Method not found: {other}"),
            ),
        };

        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    async fn call_tool(&self, id: Value, params: Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::failure(id, ErrorCode::InvalidParams, "Missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match self.router.call(name, arguments).await {
            Ok(output) => JsonRpcResponse::success(id, output.into_call_result()),
            Err(err) => JsonRpcResponse::from_error(id, err),
        }
    }

    /// Serve frames from `reader` until EOF or cancellation.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        cancel: CancellationToken,
    ) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        let mut writer = BufWriter::new(writer);

        loop {
            let line = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("MCP session cancelled");
                    break;
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                tracing::info!("MCP input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;
                writer.write_all(encoded.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        writer.flush().await
    }

    /// Serve over the process's stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if stdio fails.
    pub async fn run_stdio(&self, cancel: CancellationToken) -> std::io::Result<()> {
        tracing::info!(protocol = PROTOCOL_VERSION, "Serving MCP over stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout(), cancel)
            .await
    }
}
