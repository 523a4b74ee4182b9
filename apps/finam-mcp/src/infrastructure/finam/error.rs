//! Mapping of transport and payload failures into `ApiError`.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::application::ports::{ApiError, ErrorBody};

/// Classify a reqwest failure.
pub(super) fn transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_builder() {
        return ApiError::validation("request", err.to_string());
    }

    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("cannot connect: {err}")
    } else {
        err.to_string()
    };

    ApiError::Connectivity { message }
}

/// Error for a non-2xx response outside the session handshake.
pub(super) fn upstream_error(status: StatusCode, raw_body: &str) -> ApiError {
    ApiError::Upstream {
        status: status.as_u16(),
        body: ErrorBody::from_raw(raw_body),
    }
}

/// Error for a non-2xx response from the session-creation endpoint.
pub(super) fn session_error(status: StatusCode, raw_body: &str) -> ApiError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::CredentialRejected {
                status: status.as_u16(),
                body: ErrorBody::from_raw(raw_body),
            }
        }
        _ => upstream_error(status, raw_body),
    }
}

/// Validate a success payload into its typed shape.
pub(super) fn decode<T: DeserializeOwned>(context: &str, raw_body: &str) -> Result<T, ApiError> {
    let raw = if raw_body.trim().is_empty() {
        "null"
    } else {
        raw_body
    };
    serde_json::from_str(raw).map_err(|e| ApiError::validation(context, e.to_string()))
}
