#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Finam MCP - Brokerage API Tool Server
//!
//! Exposes the Finam Trade REST API to language-model agents as Model
//! Context Protocol tools: account state, order management, reference data
//! and market data, all behind one long-lived authenticated session.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Wire vocabulary with no I/O
//!   - `enums`: Closed enumerations with name-then-value parsing
//!   - `timestamp`: Caller timestamp interpretation
//!   - `asset_search`: Asset filtering and pagination
//!
//! - **Application**: Contracts and use cases
//!   - `dto`: Typed response and request payloads
//!   - `ports`: `FinamApiPort` and the `ApiError` taxonomy
//!   - `use_cases`: Asset search
//!
//! - **Infrastructure**: Adapters and transports
//!   - `finam`: REST client, session store, proactive refresh
//!   - `mcp`: JSON-RPC framing, tool catalog, dispatch
//!   - `http`: MCP-over-HTTP, health and metrics
//!   - `config`, `metrics`, `telemetry`
//!
//! # Request Flow
//!
//! ```text
//! agent -> McpServer -> ToolRouter -> FinamApiPort -> FinamHttpClient -> api.finam.ru
//!                                                       |
//!                                                  TokenStore (refresh, retry on 401)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Wire vocabulary with no external dependencies.
pub mod domain;

/// Application layer - Ports, DTOs and use cases.
pub mod application;

/// Infrastructure layer - Adapters and transports.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::asset_search::{AssetQuery, AssetRecord};
pub use domain::enums::{EnumParseError, WireEnum};
pub use domain::timestamp::{TimestampParseError, format_timestamp, parse_timestamp};

// Application contracts
pub use application::ports::{ApiError, ErrorBody, FinamApiPort, TimeWindow};
pub use application::use_cases::GetAssetsUseCase;

// Infrastructure config
pub use infrastructure::config::{
    AppConfig, ConfigError, Credentials, FinamSettings, ServerSettings, Transport,
};

// Finam adapter
pub use infrastructure::finam::{
    DEFAULT_BASE_URL, FinamApiClient, FinamClientConfig, FinamHttpClient, SessionState,
};

// MCP surface
pub use infrastructure::mcp::{McpServer, PROTOCOL_VERSION, ToolOutput, ToolRouter};

// HTTP transport
pub use infrastructure::http::{HttpServer, HttpServerError, HttpServerState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
