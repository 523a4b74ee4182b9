//! Market data DTOs: bars, quotes, trades and the order book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::{Trade, Value};
use crate::domain::enums::OrderBookRowAction;

/// OHLCV candle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Candle open time.
    pub timestamp: DateTime<Utc>,
    /// Open price.
    pub open: Value,
    /// High price.
    pub high: Value,
    /// Low price.
    pub low: Value,
    /// Close price.
    pub close: Value,
    /// Volume in units.
    pub volume: Value,
}

/// Response from `GET /v1/instruments/{symbol}/bars`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarsResponse {
    /// Instrument symbol.
    pub symbol: String,
    /// Candles in the window.
    #[serde(default)]
    pub bars: Vec<Bar>,
}

/// Response from `GET /v1/instruments/{symbol}/trades/latest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestTrades {
    /// Instrument symbol.
    pub symbol: String,
    /// Most recent trades.
    #[serde(default)]
    pub trades: Vec<Trade>,
}

/// Option analytics attached to a quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteOption {
    /// Open interest.
    pub open_interest: Value,
    /// Implied volatility.
    pub implied_volatility: Value,
    /// Theoretical price.
    pub theoretical_price: Value,
    /// Delta.
    pub delta: Value,
    /// Gamma.
    pub gamma: Value,
    /// Theta.
    pub theta: Value,
    /// Vega.
    pub vega: Value,
    /// Rho.
    pub rho: Value,
}

/// Latest quote snapshot. Prices are decimal strings; `"0"` means no side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument symbol.
    pub symbol: String,
    /// Snapshot time.
    pub timestamp: DateTime<Utc>,
    /// Best ask.
    #[serde(default)]
    pub ask: String,
    /// Ask size.
    #[serde(default)]
    pub ask_size: String,
    /// Best bid.
    #[serde(default)]
    pub bid: String,
    /// Bid size.
    #[serde(default)]
    pub bid_size: String,
    /// Last trade price.
    #[serde(default)]
    pub last: String,
    /// Last trade size.
    #[serde(default)]
    pub last_size: String,
    /// Daily volume.
    #[serde(default)]
    pub volume: String,
    /// Daily turnover.
    #[serde(default)]
    pub turnover: String,
    /// Daily open.
    #[serde(default)]
    pub open: String,
    /// Daily high.
    #[serde(default)]
    pub high: String,
    /// Daily low.
    #[serde(default)]
    pub low: String,
    /// Daily close.
    #[serde(default)]
    pub close: String,
    /// Last minus close.
    #[serde(default)]
    pub change: String,
    /// Option analytics, for option instruments.
    #[serde(default)]
    pub option: Option<QuoteOption>,
}

/// Response from `GET /v1/instruments/{symbol}/quotes/latest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQuote {
    /// Instrument symbol.
    pub symbol: String,
    /// Quote snapshot.
    pub quote: Quote,
}

/// Order book level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookRow {
    /// Level price.
    pub price: Value,
    /// Size offered.
    #[serde(default)]
    pub sell_size: Value,
    /// Size bid.
    #[serde(default)]
    pub buy_size: Value,
    /// Change kind.
    #[serde(default)]
    pub action: OrderBookRowAction,
    /// Market participant id.
    #[serde(default)]
    pub mpid: String,
    /// Level update time.
    pub timestamp: DateTime<Utc>,
}

/// Order book levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Levels, best first.
    #[serde(default)]
    pub rows: Vec<OrderBookRow>,
}

/// Response from `GET /v1/instruments/{symbol}/orderbook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookResponse {
    /// Instrument symbol.
    pub symbol: String,
    /// Book snapshot.
    pub orderbook: OrderBook,
}
