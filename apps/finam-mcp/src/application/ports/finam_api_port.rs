//! Finam API Port (Driven Port)
//!
//! Interface to the Finam Trade REST API. Implementations own the session
//! token lifecycle; callers never see tokens, only typed responses or an
//! [`ApiError`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::dto::{
    Account, Asset, AssetParams, AssetsResponse, BarsResponse, Clock, ExchangesResponse,
    LastQuote, LatestTrades, OptionsChain, Order, OrderBookResponse, OrdersResponse,
    PlaceOrderRequest, SymbolSchedule, TradesResponse, TransactionsResponse,
};
use crate::domain::enums::{EnumParseError, TimeFrame};
use crate::domain::timestamp::TimestampParseError;

// =============================================================================
// Errors
// =============================================================================

/// Error body returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body that was not JSON.
    Text(String),
}

impl ErrorBody {
    /// Keep structured bodies structured; anything else stays raw text.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        serde_json::from_str(raw).map_or_else(|_| Self::Text(raw.to_string()), Self::Json)
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Failure of a Finam API operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The session endpoint rejected the credential. Not retried.
    #[error("credential rejected (HTTP {status}): {body}")]
    CredentialRejected {
        /// HTTP status.
        status: u16,
        /// Error body.
        body: ErrorBody,
    },

    /// The request was unauthorized again after one re-authentication.
    #[error("authorization failed after re-authentication: {body}")]
    AuthorizationFailed {
        /// Body of the second 401.
        body: ErrorBody,
    },

    /// Any other non-2xx response.
    #[error("upstream error (HTTP {status}): {body}")]
    Upstream {
        /// HTTP status.
        status: u16,
        /// Error body.
        body: ErrorBody,
    },

    /// Payload or argument did not match the expected shape.
    #[error("validation failed for {context}: {message}")]
    Validation {
        /// What was being validated.
        context: String,
        /// Why it failed.
        message: String,
    },

    /// The server could not be reached.
    #[error("connectivity error: {message}")]
    Connectivity {
        /// Transport error details.
        message: String,
    },
}

impl ApiError {
    /// Build a validation error.
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Stable taxonomy name for envelopes and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CredentialRejected { .. } => "credential_rejected",
            Self::AuthorizationFailed { .. } => "authorization_failed",
            Self::Upstream { .. } => "upstream_error",
            Self::Validation { .. } => "validation_failed",
            Self::Connectivity { .. } => "connectivity_error",
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::CredentialRejected { status, .. } | Self::Upstream { status, .. } => {
                Some(*status)
            }
            Self::AuthorizationFailed { .. } => Some(401),
            Self::Validation { .. } | Self::Connectivity { .. } => None,
        }
    }

    /// Error body carried by the error, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::CredentialRejected { body, .. }
            | Self::AuthorizationFailed { body }
            | Self::Upstream { body, .. } => Some(body),
            Self::Validation { .. } | Self::Connectivity { .. } => None,
        }
    }
}

impl From<EnumParseError> for ApiError {
    fn from(err: EnumParseError) -> Self {
        Self::validation(err.kind, err.to_string())
    }
}

impl From<TimestampParseError> for ApiError {
    fn from(err: TimestampParseError) -> Self {
        Self::validation("timestamp", err.to_string())
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Time window for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window; start must not be after end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ApiError> {
        if start > end {
            return Err(ApiError::validation(
                "interval",
                format!("start_time {start} is after end_time {end}"),
            ));
        }
        Ok(Self { start, end })
    }
}

// =============================================================================
// Port
// =============================================================================

/// Port for the Finam Trade REST API.
#[async_trait]
pub trait FinamApiPort: Send + Sync {
    /// Account snapshot.
    async fn get_account(&self, account_id: &str) -> Result<Account, ApiError>;

    /// Trade history in a window.
    async fn trades(
        &self,
        account_id: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<TradesResponse, ApiError>;

    /// Cash transactions in a window.
    async fn transactions(
        &self,
        account_id: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<TransactionsResponse, ApiError>;

    /// Full asset listing, unfiltered.
    async fn assets(&self) -> Result<AssetsResponse, ApiError>;

    /// Server time.
    async fn clock(&self) -> Result<Clock, ApiError>;

    /// Trading venues.
    async fn exchanges(&self) -> Result<ExchangesResponse, ApiError>;

    /// Instrument details for an account.
    async fn get_asset(&self, account_id: &str, symbol: &str) -> Result<Asset, ApiError>;

    /// Trading parameters for an account.
    async fn get_asset_params(
        &self,
        account_id: &str,
        symbol: &str,
    ) -> Result<AssetParams, ApiError>;

    /// Option chain on an underlying.
    async fn options_chain(&self, underlying_symbol: &str) -> Result<OptionsChain, ApiError>;

    /// Trading schedule.
    async fn schedule(&self, symbol: &str) -> Result<SymbolSchedule, ApiError>;

    /// Cancel an order.
    async fn cancel_order(&self, account_id: &str, order_id: &str) -> Result<Order, ApiError>;

    /// Single order.
    async fn get_order(&self, account_id: &str, order_id: &str) -> Result<Order, ApiError>;

    /// All orders on an account.
    async fn get_orders(&self, account_id: &str) -> Result<OrdersResponse, ApiError>;

    /// Place an order.
    async fn place_order(
        &self,
        account_id: &str,
        request: &PlaceOrderRequest,
    ) -> Result<Order, ApiError>;

    /// Candles in a window.
    async fn bars(
        &self,
        symbol: &str,
        window: TimeWindow,
        timeframe: TimeFrame,
    ) -> Result<BarsResponse, ApiError>;

    /// Latest quote.
    async fn last_quote(&self, symbol: &str) -> Result<LastQuote, ApiError>;

    /// Latest trades.
    async fn latest_trades(&self, symbol: &str) -> Result<LatestTrades, ApiError>;

    /// Order book snapshot.
    async fn order_book(&self, symbol: &str) -> Result<OrderBookResponse, ApiError>;
}
