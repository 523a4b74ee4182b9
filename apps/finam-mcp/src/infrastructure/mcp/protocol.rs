//! JSON-RPC 2.0 frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Input is not JSON.
    ParseError = -32700,
    /// JSON is not a valid request object.
    InvalidRequest = -32600,
    /// Unknown method.
    MethodNotFound = -32601,
    /// Missing or unknown tool, or malformed params.
    InvalidParams = -32602,
    /// Server-side failure outside any tool.
    InternalError = -32603,
}

impl ErrorCode {
    /// Numeric code.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Protocol-level failure, reported as a JSON-RPC error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct McpError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl McpError {
    /// Create an error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Incoming request or notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, must be "2.0".
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Whether no response is expected.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echo of the request id, null when it could not be read.
    pub id: Value,
    /// Result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// Error member of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

impl JsonRpcResponse {
    /// Successful response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    #[must_use]
    pub fn failure(id: Value, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.as_i32(),
                message: message.into(),
            }),
        }
    }

    /// Error response from an `McpError`.
    #[must_use]
    pub fn from_error(id: Value, err: McpError) -> Self {
        Self::failure(id, err.code, err.message)
    }
}
