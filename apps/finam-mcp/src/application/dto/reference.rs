//! Reference data DTOs: assets, exchanges, schedules, option chains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::{Cash, Value};
use crate::domain::asset_search::AssetRecord;
use crate::domain::enums::{LongableStatus, ShortableStatus};

/// Entry of the full asset listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Full symbol, `TICKER@MIC`.
    pub symbol: String,
    /// Unique instrument id.
    pub id: String,
    /// Exchange ticker.
    pub ticker: String,
    /// Market identifier code.
    pub mic: String,
    /// ISIN, empty when not assigned.
    #[serde(default)]
    pub isin: String,
    /// Instrument type.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Human-readable name.
    pub name: String,
}

impl AssetRecord for AssetInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn mic(&self) -> &str {
        &self.mic
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn asset_type(&self) -> &str {
        &self.asset_type
    }
}

/// Response from `GET /v1/assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsResponse {
    /// Every asset the API knows about.
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
}

/// Instrument details from `GET /v1/assets/{symbol}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Trading board.
    pub board: String,
    /// Unique instrument id.
    pub id: String,
    /// Exchange ticker.
    pub ticker: String,
    /// Market identifier code.
    pub mic: String,
    /// ISIN.
    #[serde(default)]
    pub isin: String,
    /// Instrument type.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Human-readable name.
    pub name: String,
    /// Lot size.
    pub lot_size: Value,
    /// Price decimals.
    pub decimals: i32,
    /// Minimum price step.
    pub min_step: String,
    /// Quote currency.
    #[serde(default)]
    pub quote_currency: String,
}

/// Server clock from `GET /v1/assets/clock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Current server time.
    pub timestamp: DateTime<Utc>,
}

/// Trading venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Market identifier code.
    pub mic: String,
    /// Venue name.
    pub name: String,
}

/// Response from `GET /v1/exchanges`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangesResponse {
    /// Known venues.
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
}

/// Long availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Longable {
    /// Status.
    pub value: LongableStatus,
    /// Days trading has been halted.
    #[serde(default)]
    pub halted_days: i32,
}

/// Short availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortable {
    /// Status.
    pub value: ShortableStatus,
    /// Days trading has been halted.
    #[serde(default)]
    pub halted_days: i32,
}

/// Trading parameters from `GET /v1/assets/{symbol}/params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    /// Instrument symbol.
    pub symbol: String,
    /// Account the parameters apply to.
    pub account_id: String,
    /// Whether the instrument can be traded.
    pub tradeable: bool,
    /// Long availability.
    pub longable: Longable,
    /// Short availability.
    pub shortable: Shortable,
    /// Long risk rate.
    #[serde(default)]
    pub long_risk_rate: Value,
    /// Long collateral.
    #[serde(default)]
    pub long_collateral: Option<Cash>,
    /// Short risk rate.
    #[serde(default)]
    pub short_risk_rate: Value,
    /// Initial margin for a long position.
    #[serde(default)]
    pub long_initial_margin: Option<Cash>,
}

/// Calendar date without a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    /// Year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
}

/// Option contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Contract symbol.
    pub symbol: String,
    /// Call or put, as sent by the API.
    #[serde(rename = "type")]
    pub option_type: String,
    /// Contract size.
    pub contract_size: Value,
    /// Last trading day.
    pub trade_last_day: Date,
    /// Strike price.
    pub strike: Value,
    /// First expiration day.
    pub expiration_first_day: Date,
    /// Last expiration day.
    pub expiration_last_day: Date,
}

/// Response from `GET /v1/assets/{symbol}/options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsChain {
    /// Underlying symbol.
    pub symbol: String,
    /// Contracts on the underlying.
    #[serde(default)]
    pub options: Vec<OptionContract>,
}

/// Time interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Start, inclusive.
    pub start_time: DateTime<Utc>,
    /// End, exclusive.
    pub end_time: DateTime<Utc>,
}

/// Trading session within a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    /// Session type.
    #[serde(rename = "type")]
    pub session_type: String,
    /// Session interval.
    pub interval: Interval,
}

/// Response from `GET /v1/assets/{symbol}/schedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSchedule {
    /// Instrument symbol.
    pub symbol: String,
    /// Sessions in order.
    #[serde(default)]
    pub sessions: Vec<TradingSession>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_info_exposes_search_fields() {
        let info: AssetInfo = serde_json::from_str(
            r#"{"symbol":"PTON@XNGS","id":"910354","ticker":"PTON","mic":"XNGS",
                "isin":"US70614W1009","type":"EQUITIES","name":"Peloton Interactive, Inc."}"#,
        )
        .unwrap();
        assert_eq!(AssetRecord::id(&info), "910354");
        assert_eq!(AssetRecord::asset_type(&info), "EQUITIES");
    }

    #[test]
    fn asset_params_parse_status_enums() {
        let params: AssetParams = serde_json::from_str(
            r#"{
                "symbol": "SBER@MISX", "account_id": "1", "tradeable": true,
                "longable": {"value": "AVAILABLE", "halted_days": 0},
                "shortable": {"value": "HTB", "halted_days": 2}
            }"#,
        )
        .unwrap();
        assert_eq!(params.longable.value, LongableStatus::Available);
        assert_eq!(params.shortable.value, ShortableStatus::Htb);
    }

    #[test]
    fn unknown_status_fails_validation() {
        let result = serde_json::from_str::<Longable>(r#"{"value": "MAYBE"}"#);
        assert!(result.is_err());
    }
}
