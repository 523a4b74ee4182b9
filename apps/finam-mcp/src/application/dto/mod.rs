//! Data Transfer Objects (DTOs)
//!
//! Plain data contracts for Finam API payloads. Every response is validated
//! against these shapes at the client boundary; a mismatch is a
//! `ValidationFailed` error rather than a partially-typed value.

mod account;
mod market_data;
mod orders;
mod reference;
mod session;

pub use account::{
    Account, Cash, PortfolioMc, Position, Trade, TradesResponse, Transaction,
    TransactionsResponse, Value,
};
pub use market_data::{
    Bar, BarsResponse, LastQuote, LatestTrades, OrderBook, OrderBookResponse, OrderBookRow, Quote,
    QuoteOption,
};
pub use orders::{Leg, Order, OrderDetails, OrdersResponse, PlaceOrderRequest};
pub use reference::{
    Asset, AssetInfo, AssetParams, AssetsResponse, Clock, Date, Exchange, ExchangesResponse,
    Interval, Longable, OptionContract, OptionsChain, Shortable, SymbolSchedule, TradingSession,
};
pub use session::{AuthResponse, TokenDetails};
