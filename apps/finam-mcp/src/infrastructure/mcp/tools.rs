//! Tool dispatch.
//!
//! Parses tool arguments, calls `FinamApiPort` (or the asset search use
//! case) and wraps the outcome in an envelope. API failures become
//! `isError` results carrying the error taxonomy; only an unknown tool name
//! is a protocol error.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::catalog::Tool;
use super::envelope::{ErrorEnvelope, OkEnvelope};
use super::protocol::{ErrorCode, McpError};
use crate::application::dto::{self, PlaceOrderRequest};
use crate::application::ports::{ApiError, FinamApiPort, TimeWindow};
use crate::application::use_cases::GetAssetsUseCase;
use crate::domain::asset_search::AssetQuery;
use crate::domain::enums::{
    AssetType, KNOWN_MICS, OrderType, Side, StopCondition, TimeFrame, TimeInForce, ValidBefore,
    WireEnum,
};
use crate::domain::timestamp::parse_timestamp;
use crate::infrastructure::metrics::record_tool_call;

const DEFAULT_HISTORY_LIMIT: u32 = 50;

// =============================================================================
// Output
// =============================================================================

/// Result of a tool call, before protocol framing.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    envelope: Value,
    is_error: bool,
}

impl ToolOutput {
    /// Success or error envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Value {
        &self.envelope
    }

    /// Whether the call failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// MCP `tools/call` result.
    #[must_use]
    pub fn into_call_result(self) -> Value {
        json!({
            "content": [{"type": "text", "text": self.envelope.to_string()}],
            "isError": self.is_error,
        })
    }
}

// =============================================================================
// Router
// =============================================================================

/// Routes tool calls onto the Finam API.
///
/// Holds one long-lived port so the session survives across calls.
pub struct ToolRouter {
    api: Arc<dyn FinamApiPort>,
    assets: GetAssetsUseCase<dyn FinamApiPort>,
    account_id: String,
    endpoint_base: String,
}

impl ToolRouter {
    /// Create a router for `account_id`. `base_url` prefixes endpoint templates.
    #[must_use]
    pub fn new(api: Arc<dyn FinamApiPort>, account_id: impl Into<String>, base_url: &str) -> Self {
        Self {
            assets: GetAssetsUseCase::new(Arc::clone(&api)),
            api,
            account_id: account_id.into(),
            endpoint_base: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Account used by account-scoped tools.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Invoke a tool by name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` for an unknown tool. Every other failure is
    /// reported inside the returned `ToolOutput`.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput, McpError> {
        let tool = Tool::from_name(name).ok_or_else(|| {
            McpError::new(ErrorCode::InvalidParams, format!("Unknown tool: {name}"))
        })?;

        let call_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::debug!(%call_id, tool = name, "Tool call started");

        let output = match self.dispatch(tool, arguments).await {
            Ok(envelope) => {
                tracing::info!(
                    %call_id,
                    tool = name,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Tool call succeeded"
                );
                record_tool_call(name, "success");
                ToolOutput {
                    envelope,
                    is_error: false,
                }
            }
            Err(err) => {
                tracing::warn!(
                    %call_id,
                    tool = name,
                    kind = err.kind(),
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Tool call failed"
                );
                record_tool_call(name, err.kind());
                let envelope = serde_json::to_value(ErrorEnvelope::from(&err))
                    .unwrap_or_else(|_| json!({"code": 0, "message": err.to_string()}));
                ToolOutput {
                    envelope,
                    is_error: true,
                }
            }
        };

        Ok(output)
    }

    #[allow(clippy::too_many_lines)]
    async fn dispatch(&self, tool: Tool, arguments: Value) -> Result<Value, ApiError> {
        let account = self.account_id.as_str();
        match tool {
            Tool::GetAccount => {
                let details = self.api.get_account(account).await?;
                self.upstream(&details, "/v1/accounts/{account_id}", "GET")
            }
            Tool::Trades => {
                let args: WindowArgs = parse_args(tool, arguments)?;
                let details = self.api.trades(account, args.window()?, args.limit).await?;
                self.upstream(&details, "/v1/accounts/{account_id}/trades", "GET")
            }
            Tool::Transactions => {
                let args: WindowArgs = parse_args(tool, arguments)?;
                let details = self
                    .api
                    .transactions(account, args.window()?, args.limit)
                    .await?;
                self.upstream(&details, "/v1/accounts/{account_id}/transactions", "GET")
            }
            Tool::Assets => {
                let query: AssetQuery = parse_args(tool, drop_empty(arguments))?;
                let details = self.assets.execute(&query).await?;
                self.upstream(&details, "/v1/assets", "GET")
            }
            Tool::Clock => {
                let details = self.api.clock().await?;
                self.upstream(&details, "/v1/assets/clock", "GET")
            }
            Tool::Exchanges => {
                let details = self.api.exchanges().await?;
                self.upstream(&details, "/v1/exchanges", "GET")
            }
            Tool::GetAsset => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.get_asset(account, &args.symbol).await?;
                self.upstream(&details, "/v1/assets/{symbol}", "GET")
            }
            Tool::GetAssetParams => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.get_asset_params(account, &args.symbol).await?;
                self.upstream(&details, "/v1/assets/{symbol}/params", "GET")
            }
            Tool::OptionsChain => {
                let args: UnderlyingArgs = parse_args(tool, arguments)?;
                let details = self.api.options_chain(&args.underlying_symbol).await?;
                self.upstream(&details, "/v1/assets/{underlying_symbol}/options", "GET")
            }
            Tool::Schedule => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.schedule(&args.symbol).await?;
                self.upstream(&details, "/v1/assets/{symbol}/schedule", "GET")
            }
            Tool::CancelOrder => {
                let args: OrderIdArgs = parse_args(tool, arguments)?;
                let details = self.api.cancel_order(account, &args.order_id).await?;
                self.upstream(
                    &details,
                    "/v1/accounts/{account_id}/orders/{order_id}",
                    "DELETE",
                )
            }
            Tool::GetOrder => {
                let args: OrderIdArgs = parse_args(tool, arguments)?;
                let details = self.api.get_order(account, &args.order_id).await?;
                self.upstream(&details, "/v1/accounts/{account_id}/orders/{order_id}", "GET")
            }
            Tool::GetOrders => {
                let details = self.api.get_orders(account).await?;
                self.upstream(&details, "/v1/accounts/{account_id}/orders", "GET")
            }
            Tool::PlaceOrder => {
                let args: PlaceOrderArgs = parse_args(tool, arguments)?;
                let request = args.into_request()?;
                let details = self.api.place_order(account, &request).await?;
                self.upstream(&details, "/v1/accounts/{account_id}/orders", "POST")
            }
            Tool::Bars => {
                let args: BarsArgs = parse_args(tool, arguments)?;
                let window = TimeWindow::new(
                    parse_timestamp(&args.start_time)?,
                    parse_timestamp(&args.end_time)?,
                )?;
                let timeframe: TimeFrame = args.timeframe.resolve()?;
                let details = self.api.bars(&args.symbol, window, timeframe).await?;
                self.upstream(&details, "/v1/instruments/{symbol}/bars", "GET")
            }
            Tool::LastQuote => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.last_quote(&args.symbol).await?;
                self.upstream(&details, "/v1/instruments/{symbol}/quotes/latest", "GET")
            }
            Tool::LatestTrades => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.latest_trades(&args.symbol).await?;
                self.upstream(&details, "/v1/instruments/{symbol}/trades/latest", "GET")
            }
            Tool::OrderBook => {
                let args: SymbolArgs = parse_args(tool, arguments)?;
                let details = self.api.order_book(&args.symbol).await?;
                self.upstream(&details, "/v1/instruments/{symbol}/orderbook", "GET")
            }
            Tool::GetAssetTypes => to_json(&OkEnvelope::local(AssetType::names())),
            Tool::GetMicList => to_json(&OkEnvelope::local(KNOWN_MICS)),
        }
    }

    fn upstream<T: Serialize>(
        &self,
        details: &T,
        template: &str,
        method: &'static str,
    ) -> Result<Value, ApiError> {
        to_json(&OkEnvelope::upstream(
            details,
            format!("{}{template}", self.endpoint_base),
            method,
        ))
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("account_id", &self.account_id)
            .field("endpoint_base", &self.endpoint_base)
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::validation("tool result", e.to_string()))
}

fn parse_args<T: DeserializeOwned>(tool: Tool, arguments: Value) -> Result<T, ApiError> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| ApiError::validation(format!("{} arguments", tool.name()), e.to_string()))
}

/// Remove null and empty-string members so they read as "no filter".
fn drop_empty(arguments: Value) -> Value {
    match arguments {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null() && v.as_str().is_none_or(|s| !s.trim().is_empty()))
                .collect(),
        ),
        other => other,
    }
}

// =============================================================================
// Argument types
// =============================================================================

/// Enum argument given as a name or a numeric value.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
enum EnumArg {
    Number(u64),
    Text(String),
}

impl EnumArg {
    fn resolve<E: WireEnum>(&self) -> Result<E, ApiError> {
        let parsed = match self {
            Self::Number(n) => E::parse(&n.to_string()),
            Self::Text(s) => E::parse(s.trim()),
        };
        Ok(parsed?)
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

fn optional_enum<E: WireEnum + Default>(arg: Option<&EnumArg>) -> Result<E, ApiError> {
    match arg {
        Some(arg) if !arg.is_blank() => arg.resolve(),
        _ => Ok(E::default()),
    }
}

/// Decimal argument given as a string or a JSON number.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
enum DecimalArg {
    Number(serde_json::Number),
    Text(String),
}

impl DecimalArg {
    fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }

    fn resolve(&self, field: &str) -> Result<String, ApiError> {
        let raw = self.raw();
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|e| ApiError::validation(field, format!("{raw:?} is not a decimal: {e}")))?;
        Ok(raw)
    }
}

/// Optional decimal; absent or blank becomes an empty string.
fn optional_decimal(field: &str, arg: Option<&DecimalArg>) -> Result<String, ApiError> {
    match arg {
        Some(arg) if !arg.raw().is_empty() => arg.resolve(field),
        _ => Ok(String::new()),
    }
}

#[derive(Debug, serde::Deserialize)]
struct WindowArgs {
    start_time: String,
    end_time: String,
    #[serde(default = "default_history_limit")]
    limit: u32,
}

const fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

impl WindowArgs {
    fn window(&self) -> Result<TimeWindow, ApiError> {
        TimeWindow::new(
            parse_timestamp(&self.start_time)?,
            parse_timestamp(&self.end_time)?,
        )
    }
}

#[derive(Debug, serde::Deserialize)]
struct SymbolArgs {
    symbol: String,
}

#[derive(Debug, serde::Deserialize)]
struct UnderlyingArgs {
    underlying_symbol: String,
}

#[derive(Debug, serde::Deserialize)]
struct OrderIdArgs {
    order_id: String,
}

#[derive(Debug, serde::Deserialize)]
struct BarsArgs {
    symbol: String,
    start_time: String,
    end_time: String,
    timeframe: EnumArg,
}

#[derive(Debug, serde::Deserialize)]
struct LegArg {
    symbol: String,
    #[serde(default)]
    quantity: Option<DecimalArg>,
    #[serde(default)]
    side: Option<EnumArg>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum LegsArg {
    Many(Vec<LegArg>),
    One(LegArg),
}

#[derive(Debug, serde::Deserialize)]
struct PlaceOrderArgs {
    symbol: String,
    quantity: DecimalArg,
    side: EnumArg,
    #[serde(rename = "type")]
    order_type: EnumArg,
    time_in_force: EnumArg,
    #[serde(default)]
    limit_price: Option<DecimalArg>,
    #[serde(default)]
    stop_price: Option<DecimalArg>,
    #[serde(default)]
    stop_condition: Option<EnumArg>,
    #[serde(default)]
    legs: Option<LegsArg>,
    #[serde(default)]
    client_order_id: Option<String>,
    #[serde(default)]
    valid_before: Option<EnumArg>,
    #[serde(default)]
    comment: Option<String>,
}

impl PlaceOrderArgs {
    fn into_request(self) -> Result<PlaceOrderRequest, ApiError> {
        let legs = match self.legs {
            None => None,
            Some(LegsArg::One(leg)) => Some(vec![leg.into_leg()?]),
            Some(LegsArg::Many(legs)) => Some(
                legs.into_iter()
                    .map(LegArg::into_leg)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(PlaceOrderRequest {
            symbol: self.symbol,
            quantity: self.quantity.resolve("quantity")?,
            side: self.side.resolve::<Side>()?,
            order_type: self.order_type.resolve::<OrderType>()?,
            time_in_force: self.time_in_force.resolve::<TimeInForce>()?,
            limit_price: optional_decimal("limit_price", self.limit_price.as_ref())?,
            stop_price: optional_decimal("stop_price", self.stop_price.as_ref())?,
            stop_condition: optional_enum::<StopCondition>(self.stop_condition.as_ref())?,
            client_order_id: self.client_order_id.unwrap_or_default(),
            valid_before: optional_enum::<ValidBefore>(self.valid_before.as_ref())?,
            comment: self.comment.unwrap_or_default(),
            legs,
        })
    }
}

impl LegArg {
    fn into_leg(self) -> Result<dto::Leg, ApiError> {
        let quantity = match self.quantity {
            Some(q) if !q.raw().is_empty() => dto::Value::new(q.resolve("legs.quantity")?),
            _ => dto::Value::default(),
        };
        Ok(dto::Leg {
            symbol: self.symbol,
            quantity,
            side: optional_enum::<Side>(self.side.as_ref())?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
