//! Payloads carried in `tools/call` results.

use serde::Serialize;

use crate::application::ports::{ApiError, ErrorBody};

/// Successful tool result.
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Always 1.
    pub code: u8,
    /// Always null.
    pub message: Option<String>,
    /// Typed response.
    pub details: T,
    /// Absolute URL template of the upstream endpoint; null for local lists.
    pub endpoint: Option<String>,
    /// Upstream HTTP method; null for local lists.
    pub method: Option<&'static str>,
}

impl<T: Serialize> OkEnvelope<T> {
    /// Result backed by an upstream call.
    pub fn upstream(details: T, endpoint: String, method: &'static str) -> Self {
        Self {
            code: 1,
            message: None,
            details,
            endpoint: Some(endpoint),
            method: Some(method),
        }
    }

    /// Result computed locally.
    pub const fn local(details: T) -> Self {
        Self {
            code: 1,
            message: None,
            details,
            endpoint: None,
            method: None,
        }
    }
}

/// Failed tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Always 0.
    pub code: u8,
    /// Error text.
    pub message: String,
    /// Classification.
    pub details: ErrorDetails,
}

/// Classification of a failed tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    /// Taxonomy name such as `upstream_error`.
    pub kind: &'static str,
    /// Upstream HTTP status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Upstream error body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ErrorBody>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        Self {
            code: 0,
            message: err.to_string(),
            details: ErrorDetails {
                kind: err.kind(),
                status: err.status(),
                body: err.body().cloned(),
            },
        }
    }
}
