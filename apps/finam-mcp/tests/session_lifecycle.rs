//! Session Lifecycle Integration Tests
//!
//! Token acquisition, proactive refresh, single re-authentication on 401 and
//! error classification against a wiremock upstream.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use chrono::Duration;
use finam_mcp::{ApiError, ErrorBody, FinamApiPort, FinamClientConfig, SessionState};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{ACCOUNT, SECRET, clock_body, hits};

#[tokio::test]
async fn one_session_serves_many_calls() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .and(header("authorization", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clock_body()))
        .expect(3)
        .mount(&server)
        .await;

    let client = common::client(&server);
    for _ in 0..3 {
        client.clock().await.unwrap();
    }

    assert_eq!(hits(&server, "/v1/sessions").await, 1);
    assert_eq!(client.http().session_state(), SessionState::Valid);
}

#[tokio::test]
async fn session_records_account_ids_from_details() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;

    let client = common::client(&server);
    client.http().ensure_valid_session().await.unwrap();

    assert_eq!(client.session_account_ids(), vec![ACCOUNT.to_string(), "42".to_string()]);
}

#[tokio::test]
async fn near_expiry_token_is_refreshed_before_use() {
    let server = MockServer::start().await;
    common::mount_session(&server, "tok-1").await;
    // Inside the default sixty-second margin.
    common::mount_details(&server, Duration::seconds(30)).await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clock_body()))
        .mount(&server)
        .await;

    let client = common::client(&server);
    client.clock().await.unwrap();
    assert_eq!(client.http().session_state(), SessionState::NearExpiry);

    client.clock().await.unwrap();
    assert_eq!(hits(&server, "/v1/sessions").await, 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clock_body()))
        .mount(&server)
        .await;

    let client = Arc::new(common::client(&server));
    let calls: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.clock().await })
        })
        .collect();
    for call in calls {
        call.await.unwrap().unwrap();
    }

    assert_eq!(hits(&server, "/v1/sessions").await, 1);
}

#[tokio::test]
async fn unauthorized_triggers_one_reauthentication_and_retry() {
    let server = MockServer::start().await;
    common::mount_session_once(&server, "tok-1").await;
    common::mount_session(&server, "tok-2").await;
    common::mount_details(&server, Duration::minutes(15)).await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .and(header("authorization", "tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .and(header("authorization", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clock_body()))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let clock = client.clock().await.unwrap();

    assert_eq!(clock.timestamp.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    assert_eq!(hits(&server, "/v1/sessions").await, 2);
    assert_eq!(hits(&server, "/v1/assets/clock").await, 2);
}

#[tokio::test]
async fn second_unauthorized_fails_and_clears_session() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "denied"})))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.clock().await.unwrap_err();

    match err {
        ApiError::AuthorizationFailed { body } => {
            assert_eq!(body, ErrorBody::Json(json!({"message": "denied"})));
        }
        other => panic!("expected AuthorizationFailed, got {other:?}"),
    }
    assert_eq!(hits(&server, "/v1/assets/clock").await, 2);
    assert_eq!(hits(&server, "/v1/sessions").await, 2);
    assert_eq!(client.http().session_state(), SessionState::Absent);
}

#[tokio::test]
async fn details_failure_falls_back_to_short_lifetime() {
    let server = MockServer::start().await;
    common::mount_session(&server, "tok-1").await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/details"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let default_client = common::client(&server);
    let before = chrono::Utc::now();
    default_client.http().ensure_valid_session().await.unwrap();
    let after = chrono::Utc::now();
    assert_eq!(default_client.http().session_state(), SessionState::Valid);
    assert!(default_client.session_account_ids().is_empty());

    // The assumed expiry stays under the server's 15 minute session lifetime.
    let expires_at = default_client.http().session_expires_at().unwrap();
    assert!(expires_at < after + Duration::minutes(15));
    assert!(expires_at >= before + Duration::minutes(14));

    // A fallback shorter than the margin is due for refresh at once.
    let short_client = common::client_with(
        FinamClientConfig::new(SECRET)
            .with_base_url(server.uri())
            .with_fallback_ttl(std::time::Duration::from_secs(30)),
    );
    short_client.http().ensure_valid_session().await.unwrap();
    assert_eq!(short_client.http().session_state(), SessionState::NearExpiry);
}

#[tokio::test]
async fn rejected_credential_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": 16})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.get_account(ACCOUNT).await.unwrap_err();

    assert!(matches!(err, ApiError::CredentialRejected { status: 401, .. }));
    assert_eq!(err.kind(), "credential_rejected");
    assert_eq!(client.http().session_state(), SessionState::Absent);
}

#[tokio::test]
async fn authenticate_returns_token() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-direct").await;

    let client = common::client(&server);
    let auth = client.authenticate().await.unwrap();

    assert_eq!(auth.token, "tok-direct");
    assert_eq!(client.http().session_state(), SessionState::Valid);
}

#[tokio::test]
async fn upstream_error_keeps_json_body() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "maintenance"})))
        .mount(&server)
        .await;

    let err = common::client(&server).clock().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.body(), Some(&ErrorBody::Json(json!({"message": "maintenance"}))));
}

#[tokio::test]
async fn upstream_error_keeps_text_body() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/exchanges"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = common::client(&server).exchanges().await.unwrap_err();
    assert_eq!(err.kind(), "upstream_error");
    assert_eq!(err.body(), Some(&ErrorBody::Text("Bad Gateway".to_string())));
}

#[tokio::test]
async fn schema_mismatch_is_validation_error() {
    let server = MockServer::start().await;
    common::mount_default_session(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/v1/assets/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"time": "noon"})))
        .mount(&server)
        .await;

    let err = common::client(&server).clock().await.unwrap_err();
    assert_eq!(err.kind(), "validation_failed");
}

#[tokio::test]
async fn unreachable_server_is_connectivity_error() {
    // Nothing listens on the discard port.
    let client = common::client_with(
        FinamClientConfig::new(SECRET)
            .with_base_url("http://127.0.0.1:9/")
            .with_timeout(std::time::Duration::from_secs(2)),
    );

    let err = client.clock().await.unwrap_err();
    assert_eq!(err.kind(), "connectivity_error");
}
