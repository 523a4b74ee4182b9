//! Finam adapter implementing `FinamApiPort`.

use std::sync::Arc;

use async_trait::async_trait;

use super::config::FinamClientConfig;
use super::http_client::FinamHttpClient;
use super::request::ApiRequest;
use crate::application::dto::{
    Account, Asset, AssetParams, AssetsResponse, AuthResponse, BarsResponse, Clock,
    ExchangesResponse, LastQuote, LatestTrades, OptionsChain, Order, OrderBookResponse,
    OrdersResponse, PlaceOrderRequest, SymbolSchedule, TradesResponse, TransactionsResponse,
};
use crate::application::ports::{ApiError, FinamApiPort, TimeWindow};
use crate::domain::enums::TimeFrame;

/// Finam Trade API adapter.
///
/// Cheap to clone; clones share one HTTP client and one session.
#[derive(Debug, Clone)]
pub struct FinamApiClient {
    http: Arc<FinamHttpClient>,
}

impl FinamApiClient {
    /// Create a new adapter.
    pub fn new(config: FinamClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(FinamHttpClient::new(config)?),
        })
    }

    /// Underlying HTTP client, for session inspection.
    #[must_use]
    pub fn http(&self) -> &FinamHttpClient {
        &self.http
    }

    /// Exchange the credential for a fresh session token.
    pub async fn authenticate(&self) -> Result<AuthResponse, ApiError> {
        self.http.authenticate().await
    }

    /// Accounts reachable with the current session.
    #[must_use]
    pub fn session_account_ids(&self) -> Vec<String> {
        self.http.session_account_ids()
    }

    // =========================================================================
    // Request builders
    // =========================================================================

    fn account(account_id: &str) -> ApiRequest {
        ApiRequest::get("/v1/accounts").segment(account_id)
    }

    fn history(collection: &str, account_id: &str, window: TimeWindow, limit: u32) -> ApiRequest {
        ApiRequest::get("/v1/accounts")
            .segment(account_id)
            .segment(collection)
            .query_timestamp("interval.start_time", &window.start)
            .query_timestamp("interval.end_time", &window.end)
            .query("limit", limit.to_string())
    }

    fn asset(symbol: &str) -> ApiRequest {
        ApiRequest::get("/v1/assets").segment(symbol)
    }

    fn order(method: reqwest::Method, account_id: &str, order_id: &str) -> ApiRequest {
        ApiRequest::new(method, "/v1/accounts")
            .segment(account_id)
            .segment("orders")
            .segment(order_id)
    }

    fn instrument(symbol: &str, tail: &str) -> ApiRequest {
        let request = ApiRequest::get("/v1/instruments").segment(symbol);
        tail.split('/')
            .fold(request, |request, part| request.segment(part))
    }

    fn bars_request(symbol: &str, window: TimeWindow, timeframe: TimeFrame) -> ApiRequest {
        Self::instrument(symbol, "bars")
            .query_timestamp("interval.start_time", &window.start)
            .query_timestamp("interval.end_time", &window.end)
            .query_enum("timeframe", timeframe)
    }

    fn place_order_request(
        account_id: &str,
        request: &PlaceOrderRequest,
    ) -> Result<ApiRequest, ApiError> {
        ApiRequest::post("/v1/accounts")
            .segment(account_id)
            .segment("orders")
            .json(request)
    }
}

#[async_trait]
impl FinamApiPort for FinamApiClient {
    async fn get_account(&self, account_id: &str) -> Result<Account, ApiError> {
        self.http.request(&Self::account(account_id)).await
    }

    async fn trades(
        &self,
        account_id: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<TradesResponse, ApiError> {
        self.http
            .request(&Self::history("trades", account_id, window, limit))
            .await
    }

    async fn transactions(
        &self,
        account_id: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<TransactionsResponse, ApiError> {
        self.http
            .request(&Self::history("transactions", account_id, window, limit))
            .await
    }

    async fn assets(&self) -> Result<AssetsResponse, ApiError> {
        self.http.request(&ApiRequest::get("/v1/assets")).await
    }

    async fn clock(&self) -> Result<Clock, ApiError> {
        self.http.request(&ApiRequest::get("/v1/assets/clock")).await
    }

    async fn exchanges(&self) -> Result<ExchangesResponse, ApiError> {
        self.http.request(&ApiRequest::get("/v1/exchanges")).await
    }

    async fn get_asset(&self, account_id: &str, symbol: &str) -> Result<Asset, ApiError> {
        self.http
            .request(&Self::asset(symbol).query("account_id", account_id))
            .await
    }

    async fn get_asset_params(
        &self,
        account_id: &str,
        symbol: &str,
    ) -> Result<AssetParams, ApiError> {
        self.http
            .request(
                &Self::asset(symbol)
                    .segment("params")
                    .query("account_id", account_id),
            )
            .await
    }

    async fn options_chain(&self, underlying_symbol: &str) -> Result<OptionsChain, ApiError> {
        self.http
            .request(&Self::asset(underlying_symbol).segment("options"))
            .await
    }

    async fn schedule(&self, symbol: &str) -> Result<SymbolSchedule, ApiError> {
        self.http
            .request(&Self::asset(symbol).segment("schedule"))
            .await
    }

    async fn cancel_order(&self, account_id: &str, order_id: &str) -> Result<Order, ApiError> {
        tracing::info!(account_id, order_id, "Cancelling order");
        let order: Order = self
            .http
            .request(&Self::order(reqwest::Method::DELETE, account_id, order_id))
            .await?;
        tracing::info!(order_id, status = %order.status, "Order cancel acknowledged");
        Ok(order)
    }

    async fn get_order(&self, account_id: &str, order_id: &str) -> Result<Order, ApiError> {
        self.http
            .request(&Self::order(reqwest::Method::GET, account_id, order_id))
            .await
    }

    async fn get_orders(&self, account_id: &str) -> Result<OrdersResponse, ApiError> {
        self.http
            .request(&Self::account(account_id).segment("orders"))
            .await
    }

    async fn place_order(
        &self,
        account_id: &str,
        request: &PlaceOrderRequest,
    ) -> Result<Order, ApiError> {
        tracing::info!(
            account_id,
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = %request.quantity,
            limit_price = %request.limit_price,
            "Submitting order to Finam"
        );

        let order: Order = self
            .http
            .request(&Self::place_order_request(account_id, request)?)
            .await?;

        tracing::info!(
            order_id = %order.order_id,
            status = %order.status,
            "Order submitted"
        );
        Ok(order)
    }

    async fn bars(
        &self,
        symbol: &str,
        window: TimeWindow,
        timeframe: TimeFrame,
    ) -> Result<BarsResponse, ApiError> {
        self.http
            .request(&Self::bars_request(symbol, window, timeframe))
            .await
    }

    async fn last_quote(&self, symbol: &str) -> Result<LastQuote, ApiError> {
        self.http
            .request(&Self::instrument(symbol, "quotes/latest"))
            .await
    }

    async fn latest_trades(&self, symbol: &str) -> Result<LatestTrades, ApiError> {
        self.http
            .request(&Self::instrument(symbol, "trades/latest"))
            .await
    }

    async fn order_book(&self, symbol: &str) -> Result<OrderBookResponse, ApiError> {
        self.http
            .request(&Self::instrument(symbol, "orderbook"))
            .await
    }
}
