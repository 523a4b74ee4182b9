//! Order DTOs and the order placement payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Value;
use crate::domain::enums::{OrderType, Side, StopCondition, TimeInForce, ValidBefore};

/// Order as echoed back by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Account id.
    pub account_id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Quantity.
    pub quantity: Value,
    /// Side name.
    pub side: String,
    /// Order type name.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force name.
    pub time_in_force: String,
    /// Limit price.
    #[serde(default)]
    pub limit_price: Option<Value>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<Value>,
    /// Stop condition name.
    #[serde(default)]
    pub stop_condition: String,
    /// Legs of a multi-leg order.
    #[serde(default)]
    pub legs: Vec<serde_json::Value>,
    /// Client-assigned id.
    #[serde(default)]
    pub client_order_id: String,
    /// Validity name.
    #[serde(default)]
    pub valid_before: String,
}

/// Order state from the order endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Exchange order id.
    pub order_id: String,
    /// Execution id.
    #[serde(default)]
    pub exec_id: String,
    /// Order status.
    pub status: String,
    /// Order parameters.
    pub order: OrderDetails,
    /// Last transaction time.
    pub transact_at: DateTime<Utc>,
}

/// Response from `GET /v1/accounts/{id}/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersResponse {
    /// Orders on the account.
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// One leg of a multi-leg order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Instrument symbol.
    pub symbol: String,
    /// Leg quantity.
    pub quantity: Value,
    /// Leg side.
    pub side: Side,
}

/// Body of `POST /v1/accounts/{id}/orders`.
///
/// Numeric fields are decimal strings; unset optional strings go out empty
/// and unset optional enums go out as their `*_UNSPECIFIED` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Quantity.
    pub quantity: String,
    /// Side.
    pub side: Side,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Limit price.
    #[serde(default)]
    pub limit_price: String,
    /// Stop price.
    #[serde(default)]
    pub stop_price: String,
    /// Stop condition.
    #[serde(default)]
    pub stop_condition: StopCondition,
    /// Client-assigned id.
    #[serde(default)]
    pub client_order_id: String,
    /// Validity.
    #[serde(default)]
    pub valid_before: ValidBefore,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Legs for multi-leg orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<Leg>>,
}

impl PlaceOrderRequest {
    /// Create a request with the required fields; the rest unset.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        quantity: impl Into<String>,
        side: Side,
        order_type: OrderType,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: quantity.into(),
            side,
            order_type,
            time_in_force,
            limit_price: String::new(),
            stop_price: String::new(),
            stop_condition: StopCondition::default(),
            client_order_id: String::new(),
            valid_before: ValidBefore::default(),
            comment: String::new(),
            legs: None,
        }
    }

    /// Set the limit price.
    #[must_use]
    pub fn with_limit_price(mut self, price: impl Into<String>) -> Self {
        self.limit_price = price.into();
        self
    }

    /// Set the stop price and trigger direction.
    #[must_use]
    pub fn with_stop(mut self, price: impl Into<String>, condition: StopCondition) -> Self {
        self.stop_price = price.into();
        self.stop_condition = condition;
        self
    }

    /// Set the client order id.
    #[must_use]
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = id.into();
        self
    }

    /// Set the validity.
    #[must_use]
    pub const fn with_valid_before(mut self, valid_before: ValidBefore) -> Self {
        self.valid_before = valid_before;
        self
    }

    /// Set the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Add a leg.
    #[must_use]
    pub fn with_leg(mut self, leg: Leg) -> Self {
        self.legs.get_or_insert_with(Vec::new).push(leg);
        self
    }
}
