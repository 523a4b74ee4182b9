//! MCP Tool Surface Integration Tests
//!
//! Full JSON-RPC frames through `McpServer` onto a wiremock upstream.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use finam_mcp::{McpServer, ToolRouter};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{ACCOUNT, clock_body, hits, order_body};

fn mcp(server: &MockServer) -> McpServer {
    let client = common::client(server);
    let router = ToolRouter::new(Arc::new(client), ACCOUNT, &server.uri());
    McpServer::new(router, "finam-mcp")
}

async fn call_tool(mcp: &McpServer, name: &str, arguments: Value) -> (bool, Value) {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments },
    });
    let response = mcp.handle_line(&frame.to_string()).await.unwrap();
    let result = response.result.expect("tools/call returns a result");
    let text = result["content"][0]["text"].as_str().unwrap();
    (
        result["isError"].as_bool().unwrap(),
        serde_json::from_str(text).unwrap(),
    )
}

#[tokio::test]
async fn session_survives_across_tool_calls() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clock_body()))
        .mount(&server)
        .await;

    let mcp = mcp(&server);
    for _ in 0..3 {
        let (is_error, envelope) = call_tool(&mcp, "clock", json!({})).await;
        assert!(!is_error);
        assert_eq!(envelope["code"], 1);
        assert_eq!(envelope["details"]["timestamp"], "2024-03-01T10:00:00Z");
    }
    assert_eq!(hits(&server, "/v1/sessions").await, 1);
}

#[tokio::test]
async fn endpoint_template_uses_base_url() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/accounts/{ACCOUNT}/orders/ORD-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("ORD-1")))
        .mount(&server)
        .await;

    let (_, envelope) = call_tool(&mcp(&server), "get_order", json!({"order_id": "ORD-1"})).await;
    assert_eq!(
        envelope["endpoint"],
        format!("{}/v1/accounts/{{account_id}}/orders/{{order_id}}", server.uri())
    );
    assert_eq!(envelope["method"], "GET");
    assert_eq!(envelope["details"]["order_id"], "ORD-1");
}

#[tokio::test]
async fn place_order_tool_fills_defaults() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/accounts/{ACCOUNT}/orders")))
        .and(body_partial_json(json!({
            "symbol": "SBER@MISX",
            "quantity": "10",
            "side": "SIDE_BUY",
            "type": "ORDER_TYPE_MARKET",
            "time_in_force": "TIME_IN_FORCE_DAY",
            "limit_price": "",
            "stop_condition": "STOP_CONDITION_UNSPECIFIED",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("ORD-2")))
        .expect(1)
        .mount(&server)
        .await;

    let (is_error, envelope) = call_tool(
        &mcp(&server),
        "place_order",
        json!({
            "symbol": "SBER@MISX",
            "quantity": "10",
            "side": 1,
            "type": "ORDER_TYPE_MARKET",
            "time_in_force": "TIME_IN_FORCE_DAY",
        }),
    )
    .await;
    assert!(!is_error, "{envelope}");
    assert_eq!(envelope["method"], "POST");
}

#[tokio::test]
async fn bars_tool_interprets_naive_timestamp_as_utc() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments/SBER@MISX/bars"))
        .and(query_param("interval.start_time", "2024-01-01T09:30:00Z"))
        .and(query_param("timeframe", "TIME_FRAME_H1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "SBER@MISX",
            "bars": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (is_error, _) = call_tool(
        &mcp(&server),
        "bars",
        json!({
            "symbol": "SBER@MISX",
            "start_time": "2024-01-01T09:30:00",
            "end_time": "2024-01-02T09:30:00Z",
            "timeframe": "TIME_FRAME_H1",
        }),
    )
    .await;
    assert!(!is_error);
}

#[tokio::test]
async fn assets_tool_filters_and_pages() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    let asset = |id: &str, ticker: &str, mic: &str| {
        json!({
            "symbol": format!("{ticker}@{mic}"),
            "id": id,
            "ticker": ticker,
            "mic": mic,
            "isin": "",
            "type": "EQUITIES",
            "name": format!("{ticker} plc"),
        })
    };
    Mock::given(method("GET"))
        .and(path("/v1/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [
                asset("30", "GAZP", "MISX"),
                asset("10", "SBER", "MISX"),
                asset("20", "SBERP", "MISX"),
                asset("40", "SBER", "XNGS"),
            ],
        })))
        .mount(&server)
        .await;

    let (is_error, envelope) = call_tool(
        &mcp(&server),
        "assets",
        json!({"ticker": "SBER", "mic": "MISX", "limit": 10}),
    )
    .await;
    assert!(!is_error, "{envelope}");
    let ids: Vec<&str> = envelope["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["10", "20"]);
}

#[tokio::test]
async fn upstream_failure_is_an_error_result() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/accounts/{ACCOUNT}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&server)
        .await;

    let (is_error, envelope) = call_tool(&mcp(&server), "get_account", json!({})).await;
    assert!(is_error);
    assert_eq!(envelope["code"], 0);
    assert_eq!(envelope["details"]["kind"], "upstream_error");
    assert_eq!(envelope["details"]["status"], 403);
    assert_eq!(envelope["details"]["body"]["message"], "forbidden");
}

#[tokio::test]
async fn local_tools_do_not_touch_upstream() {
    let server = MockServer::start().await;
    let mcp = mcp(&server);

    let (_, types) = call_tool(&mcp, "get_asset_types", json!({})).await;
    assert_eq!(types["details"].as_array().unwrap().len(), 9);

    let (_, mics) = call_tool(&mcp, "get_mic_list", json!({})).await;
    assert!(mics["details"].as_array().unwrap().contains(&json!("MISX")));

    assert!(server.received_requests().await.unwrap().is_empty());
}
