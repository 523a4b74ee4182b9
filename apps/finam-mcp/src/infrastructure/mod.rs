//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementation of `FinamApiPort` and
//! the transports that expose it as MCP tools.

/// Configuration loaded from the environment.
pub mod config;

/// Finam REST adapter with session management.
pub mod finam;

/// MCP-over-HTTP transport, health checks and metrics endpoint.
pub mod http;

/// MCP protocol, tool catalog and dispatch.
pub mod mcp;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
