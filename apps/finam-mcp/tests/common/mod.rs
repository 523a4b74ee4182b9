//! Shared wiremock fixtures for the Finam upstream.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use finam_mcp::{FinamApiClient, FinamClientConfig, format_timestamp};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "test-secret";
pub const ACCOUNT: &str = "ACC-1";

/// Client pointed at the mock server.
pub fn client(server: &MockServer) -> FinamApiClient {
    client_with(FinamClientConfig::new(SECRET).with_base_url(server.uri()))
}

pub fn client_with(config: FinamClientConfig) -> FinamApiClient {
    FinamApiClient::new(config).unwrap()
}

/// Session creation always answers with `token`.
pub async fn mount_session(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/sessions"))
        .and(body_json(json!({ "secret": SECRET })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

/// Session creation answers with `token` once, then falls through.
pub async fn mount_session_once(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Token details reporting expiry `expires_in` from now.
pub async fn mount_details(server: &MockServer, expires_in: Duration) {
    let now = Utc::now();
    Mock::given(method("POST"))
        .and(path("/v1/sessions/details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created_at": format_timestamp(&now),
            "expires_at": format_timestamp(&(now + expires_in)),
            "md_permissions": [],
            "account_ids": [ACCOUNT, 42],
            "readonly": false,
        })))
        .mount(server)
        .await;
}

/// Valid session for fifteen minutes.
pub async fn mount_default_session(server: &MockServer, token: &str) {
    mount_session(server, token).await;
    mount_details(server, Duration::minutes(15)).await;
}

pub fn clock_body() -> serde_json::Value {
    json!({ "timestamp": "2024-03-01T10:00:00Z" })
}

pub fn order_body(order_id: &str) -> serde_json::Value {
    json!({
        "order_id": order_id,
        "exec_id": "",
        "status": "ORDER_STATUS_NEW",
        "order": {
            "account_id": ACCOUNT,
            "symbol": "SBER@MISX",
            "quantity": { "value": "10" },
            "side": "SIDE_BUY",
            "type": "ORDER_TYPE_LIMIT",
            "time_in_force": "TIME_IN_FORCE_DAY",
            "limit_price": { "value": "250.5" },
        },
        "transact_at": "2024-03-01T10:00:00Z",
    })
}

/// Number of requests the server saw on `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
