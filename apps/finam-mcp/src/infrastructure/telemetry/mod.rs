//! Tracing and OpenTelemetry
//!
//! Installs the global `tracing` subscriber: an `EnvFilter`, a fmt layer on
//! stderr (stdout carries the MCP stdio channel) and, when enabled, an OTLP
//! span exporter.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Filter directives (default: `finam_mcp=info,hyper=warn,reqwest=warn`)
//! - `OTEL_ENABLED`: "true", "1" or "yes" to export spans (default: off)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: gRPC OTLP endpoint (default: http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: Service name on exported spans (default: finam-mcp)
//!
//! # Usage
//!
//! ```ignore
//! use finam_mcp::infrastructure::telemetry;
//!
//! // Keep the guard alive until shutdown so buffered spans are flushed.
//! let _guard = telemetry::init();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_SERVICE_NAME: &str = "finam-mcp";
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";
const DEFAULT_DIRECTIVES: &str = "finam_mcp=info,hyper=warn,reqwest=warn";

// =============================================================================
// Configuration
// =============================================================================

/// Span export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Export spans over OTLP.
    pub enabled: bool,
    /// OTLP gRPC endpoint.
    pub otlp_endpoint: String,
    /// `service.name` resource attribute.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            enabled: lookup("OTEL_ENABLED").is_some_and(|v| {
                matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
            }),
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otlp_endpoint),
            service_name: non_empty("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
        }
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Flushes and shuts down the span exporter when dropped.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    #[must_use]
    pub const fn is_exporting(&self) -> bool {
        self.tracer_provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("OpenTelemetry shutdown failed: {e}");
        }
    }
}

// =============================================================================
// Initialization
// =============================================================================

/// Install the subscriber using settings from the environment.
#[must_use]
pub fn init() -> TelemetryGuard {
    init_with_config(TelemetryConfig::from_env())
}

/// Install the subscriber with explicit export settings.
///
/// An exporter that cannot be built leaves plain stderr logging in place.
#[must_use]
pub fn init_with_config(config: TelemetryConfig) -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let tracer_provider = if config.enabled {
        build_tracer_provider(&config)
    } else {
        None
    };
    let otel_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    if tracer_provider.is_some() {
        tracing::info!(endpoint = %config.otlp_endpoint, "Exporting spans over OTLP");
    }

    TelemetryGuard { tracer_provider }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn build_tracer_provider(config: &TelemetryConfig) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build();

    match exporter {
        Ok(exporter) => Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_resource(
                    Resource::builder()
                        .with_service_name(config.service_name.clone())
                        .build(),
                )
                .build(),
        ),
        Err(e) => {
            // The subscriber is not installed yet.
            eprintln!("OTLP exporter unavailable, span export disabled: {e}");
            None
        }
    }
}
