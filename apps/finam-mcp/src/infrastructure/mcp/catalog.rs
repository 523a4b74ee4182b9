//! Tool catalog: names, descriptions and JSON input schemas.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::enums::{
    AssetType, OrderType, Side, StopCondition, TimeFrame, TimeInForce, ValidBefore, WireEnum,
};

/// Tool definition as listed by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON Schema of the arguments object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Account snapshot.
    GetAccount,
    /// Trade history.
    Trades,
    /// Cash transactions.
    Transactions,
    /// Filtered, paginated asset search.
    Assets,
    /// Server time.
    Clock,
    /// Trading venues.
    Exchanges,
    /// Instrument details.
    GetAsset,
    /// Instrument trading parameters.
    GetAssetParams,
    /// Option chain.
    OptionsChain,
    /// Trading schedule.
    Schedule,
    /// Cancel an order.
    CancelOrder,
    /// Single order.
    GetOrder,
    /// All orders.
    GetOrders,
    /// Place an order.
    PlaceOrder,
    /// Candles.
    Bars,
    /// Latest quote.
    LastQuote,
    /// Latest trades.
    LatestTrades,
    /// Order book.
    OrderBook,
    /// Local list of instrument types.
    GetAssetTypes,
    /// Local list of MIC codes.
    GetMicList,
}

impl Tool {
    /// All tools in listing order.
    pub const ALL: [Self; 20] = [
        Self::GetAccount,
        Self::Trades,
        Self::Transactions,
        Self::Assets,
        Self::Clock,
        Self::Exchanges,
        Self::GetAsset,
        Self::GetAssetParams,
        Self::OptionsChain,
        Self::Schedule,
        Self::CancelOrder,
        Self::GetOrder,
        Self::GetOrders,
        Self::PlaceOrder,
        Self::Bars,
        Self::LastQuote,
        Self::LatestTrades,
        Self::OrderBook,
        Self::GetAssetTypes,
        Self::GetMicList,
    ];

    /// Wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetAccount => "get_account",
            Self::Trades => "trades",
            Self::Transactions => "transactions",
            Self::Assets => "assets",
            Self::Clock => "clock",
            Self::Exchanges => "exchanges",
            Self::GetAsset => "get_asset",
            Self::GetAssetParams => "get_asset_params",
            Self::OptionsChain => "options_chain",
            Self::Schedule => "schedule",
            Self::CancelOrder => "cancel_order",
            Self::GetOrder => "get_order",
            Self::GetOrders => "get_orders",
            Self::PlaceOrder => "place_order",
            Self::Bars => "bars",
            Self::LastQuote => "last_quote",
            Self::LatestTrades => "latest_trades",
            Self::OrderBook => "order_book",
            Self::GetAssetTypes => "get_asset_types",
            Self::GetMicList => "get_mic_list",
        }
    }

    /// Look up a tool by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::GetAccount => {
                "Account snapshot for the configured account: equity, positions, cash and margin."
            }
            Self::Trades => "Account trade history between start_time and end_time (ISO-8601).",
            Self::Transactions => {
                "Account cash transactions (deposits, withdrawals, fees) between start_time and end_time."
            }
            Self::Assets => {
                "Search instruments by symbol, ticker, mic, name or type with limit/offset pagination. \
                 Results are ordered by instrument id."
            }
            Self::Clock => "Current Finam server time.",
            Self::Exchanges => "Trading venues (MIC codes) known to the API.",
            Self::GetAsset => "Instrument details for a symbol in TICKER@MIC form, e.g. AAPL@XNGS.",
            Self::GetAssetParams => {
                "Trading parameters for a symbol: long/short availability, collateral and margin."
            }
            Self::OptionsChain => "Option contracts on an underlying symbol.",
            Self::Schedule => "Trading sessions and their intervals for a symbol.",
            Self::CancelOrder => "Cancel an order on the configured account.",
            Self::GetOrder => "Details of one order on the configured account.",
            Self::GetOrders => "All orders on the configured account.",
            Self::PlaceOrder => {
                "Place an order. side, time_in_force, stop_condition and valid_before accept a name \
                 (SIDE_BUY) or its numeric value; type accepts names only. \
                 LIMIT needs limit_price, STOP needs stop_price, STOP_LIMIT needs both."
            }
            Self::Bars => "Candles for a symbol between start_time and end_time at a timeframe.",
            Self::LastQuote => "Latest quote for a symbol: bid, ask, last, volume.",
            Self::LatestTrades => "Most recent trades for a symbol.",
            Self::OrderBook => "Current order book for a symbol.",
            Self::GetAssetTypes => "Instrument types accepted by the assets type filter.",
            Self::GetMicList => "Common exchange MIC codes for building TICKER@MIC symbols.",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::GetAccount
            | Self::Clock
            | Self::Exchanges
            | Self::GetOrders
            | Self::GetAssetTypes
            | Self::GetMicList => object_schema(&json!({}), &[]),
            Self::Trades | Self::Transactions => object_schema(
                &json!({
                    "start_time": timestamp_property("Window start"),
                    "end_time": timestamp_property("Window end"),
                    "limit": {"type": "integer", "minimum": 0, "default": 50},
                }),
                &["start_time", "end_time"],
            ),
            Self::Assets => object_schema(
                &json!({
                    "symbol": {"type": "string", "description": "Exact symbol, e.g. AAPL@XNGS"},
                    "ticker": {"type": "string", "description": "Case-insensitive ticker substring"},
                    "mic": {"type": "string", "description": "Exact MIC, e.g. XNGS"},
                    "name": {"type": "string", "description": "Case-insensitive name substring"},
                    "type": enum_property::<AssetType>("Instrument type"),
                    "limit": {"type": "integer", "minimum": 0, "default": 50},
                    "offset": {"type": "integer", "minimum": 0, "default": 0},
                }),
                &[],
            ),
            Self::GetAsset | Self::GetAssetParams | Self::Schedule | Self::LastQuote
            | Self::LatestTrades | Self::OrderBook => {
                object_schema(&json!({ "symbol": symbol_property() }), &["symbol"])
            }
            Self::OptionsChain => object_schema(
                &json!({ "underlying_symbol": symbol_property() }),
                &["underlying_symbol"],
            ),
            Self::CancelOrder | Self::GetOrder => object_schema(
                &json!({ "order_id": {"type": "string", "description": "Order id"} }),
                &["order_id"],
            ),
            Self::PlaceOrder => object_schema(
                &json!({
                    "symbol": symbol_property(),
                    "quantity": decimal_property("Quantity"),
                    "side": enum_property::<Side>("Order side"),
                    "type": enum_property::<OrderType>("Order type"),
                    "time_in_force": enum_property::<TimeInForce>("Time in force"),
                    "limit_price": decimal_property("Limit price for LIMIT and STOP_LIMIT"),
                    "stop_price": decimal_property("Stop price for STOP and STOP_LIMIT"),
                    "stop_condition": enum_property::<StopCondition>("Stop trigger direction"),
                    "legs": {
                        "description": "Leg or list of legs for ORDER_TYPE_MULTI_LEG",
                        "anyOf": [leg_schema(), {"type": "array", "items": leg_schema()}],
                    },
                    "client_order_id": {"type": "string"},
                    "valid_before": enum_property::<ValidBefore>("Order validity"),
                    "comment": {"type": "string"},
                }),
                &["symbol", "quantity", "side", "type", "time_in_force"],
            ),
            Self::Bars => object_schema(
                &json!({
                    "symbol": symbol_property(),
                    "start_time": timestamp_property("Window start"),
                    "end_time": timestamp_property("Window end"),
                    "timeframe": enum_property::<TimeFrame>("Candle timeframe"),
                }),
                &["symbol", "start_time", "end_time", "timeframe"],
            ),
        }
    }

    /// Catalog entry.
    #[must_use]
    pub fn definition(self) -> ToolDef {
        ToolDef {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

static TOOL_CATALOG: LazyLock<Vec<ToolDef>> =
    LazyLock::new(|| Tool::ALL.into_iter().map(Tool::definition).collect());

/// Every tool definition in listing order.
#[must_use]
pub fn tool_catalog() -> &'static [ToolDef] {
    &TOOL_CATALOG
}

fn object_schema(properties: &Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn symbol_property() -> Value {
    json!({"type": "string", "description": "Symbol in TICKER@MIC form, e.g. AAPL@XNGS"})
}

fn timestamp_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{description}, ISO-8601; naive values are UTC"),
    })
}

fn decimal_property(description: &str) -> Value {
    json!({
        "type": ["string", "number"],
        "description": format!("{description}, decimal string such as \"190.00\""),
    })
}

fn enum_property<E: WireEnum>(description: &str) -> Value {
    let names = E::names();
    let kinds = if E::FIRST_VALUE.is_some() {
        json!(["string", "integer"])
    } else {
        json!("string")
    };
    json!({
        "type": kinds,
        "description": format!("{description}: one of {}", names.join(" | ")),
        "examples": names,
    })
}

fn leg_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": symbol_property(),
            "quantity": decimal_property("Leg quantity"),
            "side": enum_property::<Side>("Leg side"),
        },
        "required": ["symbol"],
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalog_lists_twenty_unique_tools() {
        let names: HashSet<_> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tool_catalog().len(), 20);
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("get_assets"), None);
    }

    #[test]
    fn schemas_are_objects_with_required_lists() {
        for def in tool_catalog() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert!(def.input_schema["required"].is_array(), "{}", def.name);
        }
    }

    #[test]
    fn place_order_schema_requires_core_fields() {
        let def = Tool::PlaceOrder.definition();
        let required: Vec<&str> = def.input_schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, ["symbol", "quantity", "side", "type", "time_in_force"]);
        let side = def.input_schema["properties"]["side"]["description"]
            .as_str()
            .unwrap();
        assert!(side.contains("SIDE_BUY"));
    }

    #[test]
    fn order_type_schema_is_names_only() {
        let def = Tool::PlaceOrder.definition();
        let props = &def.input_schema["properties"];
        assert_eq!(props["type"]["type"], "string");
        assert_eq!(props["side"]["type"], json!(["string", "integer"]));
    }

    #[test]
    fn definition_serializes_input_schema_key() {
        let json = serde_json::to_value(Tool::Clock.definition()).unwrap();
        assert!(json.get("inputSchema").is_some());
        assert!(json.get("input_schema").is_none());
    }
}
