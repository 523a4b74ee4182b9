//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Upstream**: Finam REST calls by endpoint and outcome, with latency
//! - **Session**: Token refreshes by reason and details-lookup fallbacks
//! - **Tools**: MCP tool invocations by tool and outcome
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` when the HTTP transport is enabled.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Repeated calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns `BuildError` if the global recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Upstream REST calls
    describe_counter!(
        "finam_mcp_upstream_requests_total",
        "Total Finam API requests by endpoint and outcome"
    );
    describe_histogram!(
        "finam_mcp_upstream_request_seconds",
        "Finam API request latency including session handling"
    );

    // Session lifecycle
    describe_counter!(
        "finam_mcp_session_refreshes_total",
        "Total session token acquisitions by reason"
    );
    describe_counter!(
        "finam_mcp_session_details_fallbacks_total",
        "Sessions whose expiry was assumed because the details lookup failed"
    );

    // Tool surface
    describe_counter!(
        "finam_mcp_tool_calls_total",
        "Total MCP tool invocations by tool and outcome"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Why a session token was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No session held yet.
    Initial,
    /// Held session within the refresh margin or expired.
    NearExpiry,
    /// Server rejected the held session.
    Unauthorized,
}

impl RefreshReason {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::NearExpiry => "near_expiry",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// Record a Finam API request and its latency.
///
/// `outcome` is `success` or an error kind.
pub fn record_upstream_request(endpoint: &str, outcome: &'static str, duration: Duration) {
    counter!(
        "finam_mcp_upstream_requests_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "finam_mcp_upstream_request_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a session token acquisition.
pub fn record_session_refresh(reason: RefreshReason) {
    counter!(
        "finam_mcp_session_refreshes_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// Record a session whose expiry fell back to the assumed lifetime.
pub fn record_details_fallback() {
    counter!("finam_mcp_session_details_fallbacks_total").increment(1);
}

/// Record an MCP tool invocation.
pub fn record_tool_call(tool: &str, outcome: &'static str) {
    counter!(
        "finam_mcp_tool_calls_total",
        "tool" => tool.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_reason_as_str() {
        assert_eq!(RefreshReason::Initial.as_str(), "initial");
        assert_eq!(RefreshReason::NearExpiry.as_str(), "near_expiry");
        assert_eq!(RefreshReason::Unauthorized.as_str(), "unauthorized");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_upstream_request("GET /v1/assets", "success", Duration::from_millis(5));
        record_session_refresh(RefreshReason::Initial);
        record_details_fallback();
        record_tool_call("get_clock", "success");
    }
}
