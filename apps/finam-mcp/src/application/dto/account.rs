//! Account, trade history and transaction DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decimal wrapper used across the API: `{"value": "123.45"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// Decimal as a string.
    #[serde(default = "Value::zero")]
    pub value: String,
}

impl Value {
    fn zero() -> String {
        "0.0".to_string()
    }

    /// Wrap a decimal string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self { value: Self::zero() }
    }
}

/// Money amount in units plus nanos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cash {
    /// ISO currency code.
    #[serde(default)]
    pub currency_code: String,
    /// Whole units.
    #[serde(default)]
    pub units: String,
    /// Fractional part in nanos.
    #[serde(default)]
    pub nanos: i64,
}

/// Open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument symbol.
    pub symbol: String,
    /// Quantity held.
    pub quantity: Value,
    /// Average entry price.
    pub average_price: Value,
    /// Current market price.
    pub current_price: Value,
    /// P&L for the day.
    #[serde(default)]
    pub daily_pnl: Value,
    /// Unrealized P&L.
    #[serde(default)]
    pub unrealized_pnl: Value,
}

/// Margin figures for a mono-currency portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMc {
    /// Cash available for trading.
    pub available_cash: Value,
    /// Initial margin.
    pub initial_margin: Value,
    /// Maintenance margin.
    pub maintenance_margin: Value,
}

/// Account snapshot from `GET /v1/accounts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub account_id: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Account status.
    pub status: String,
    /// Total equity.
    pub equity: Value,
    /// Unrealized profit.
    pub unrealized_profit: Value,
    /// Open positions.
    #[serde(default)]
    pub positions: Vec<Position>,
    /// Cash balances.
    #[serde(default)]
    pub cash: Vec<Cash>,
    /// Margin figures, absent for some account types.
    #[serde(default)]
    pub portfolio_mc: Option<PortfolioMc>,
}

/// Executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Trade id.
    pub trade_id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Execution price.
    pub price: Value,
    /// Executed size.
    pub size: Value,
    /// Side as sent by the API.
    pub side: String,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
    /// Parent order id.
    #[serde(default)]
    pub order_id: String,
    /// Account id.
    #[serde(default)]
    pub account_id: String,
}

/// Response from `GET /v1/accounts/{id}/trades`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradesResponse {
    /// Trades in the window.
    #[serde(default)]
    pub trades: Vec<Trade>,
}

/// Cash movement on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id.
    pub id: String,
    /// Category code.
    pub category: String,
    /// Booking time.
    pub timestamp: DateTime<Utc>,
    /// Related instrument, empty for pure cash movements.
    #[serde(default)]
    pub symbol: String,
    /// Amount moved.
    pub change: Cash,
    /// Category name.
    #[serde(default)]
    pub transaction_category: String,
    /// Human-readable description.
    #[serde(default)]
    pub transaction_name: String,
}

/// Response from `GET /v1/accounts/{id}/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// Transactions in the window.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_defaults_to_zero() {
        let v: Value = serde_json::from_str("{}").unwrap();
        assert_eq!(v.value, "0.0");
    }

    #[test]
    fn account_parses_minimal_payload() {
        let account: Account = serde_json::from_str(
            r#"{
                "account_id": "1899011",
                "type": "UNION",
                "status": "ACCOUNT_ACTIVE",
                "equity": {"value": "1000.50"},
                "unrealized_profit": {"value": "-3.2"},
                "positions": [{
                    "symbol": "SBER@MISX",
                    "quantity": {"value": "10"},
                    "average_price": {"value": "250.1"},
                    "current_price": {"value": "251.0"}
                }],
                "cash": [{"currency_code": "RUB", "units": "500", "nanos": 0}]
            }"#,
        )
        .unwrap();
        assert_eq!(account.account_type, "UNION");
        assert_eq!(account.positions[0].daily_pnl, Value::default());
        assert!(account.portfolio_mc.is_none());
    }

    #[test]
    fn trade_without_timestamp_is_rejected() {
        let result = serde_json::from_str::<Trade>(
            r#"{"trade_id":"1","symbol":"X","price":{"value":"1"},"size":{"value":"1"},"side":"SIDE_BUY"}"#,
        );
        assert!(result.is_err());
    }
}
