//! HTTP-level tests for the Reporting API client and the credential store.

use chrono::{Duration, Utc};
use ga_report_analytics::{
    AnalyticsClient, CachedToken, ClientConfig, CredentialStore, ReportQuery, ReportSource,
    StaticToken, TokenProvider,
};
use ga_report_common::ReportError;
use httpmock::prelude::*;
use std::sync::Arc;

const REPORT_BODY: &str = include_str!("fixtures/batch_get.json");

fn query() -> ReportQuery {
    ReportQuery::new("123456", "2019-01-01", "2019-01-03")
        .with_dimensions("date,appVersion")
        .with_metrics("sessions")
        .with_goal("goal1Completions")
}

fn client(server: &MockServer, token: &str) -> AnalyticsClient {
    AnalyticsClient::new(
        ClientConfig::default().with_endpoint(server.url("/v4/reports:batchGet")),
        Arc::new(StaticToken(token.to_string())),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_sends_namespaced_request_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v4/reports:batchGet")
                .header("authorization", "Bearer secret-token")
                .json_body_partial(
                    r#"{"reportRequests": [{
                        "viewId": "123456",
                        "dateRanges": [{"startDate": "2019-01-01", "endDate": "2019-01-03"}],
                        "metrics": [{"expression": "ga:sessions"}, {"expression": "ga:goal1Completions"}],
                        "dimensions": [{"name": "ga:date"}, {"name": "ga:appVersion"}]
                    }]}"#,
                );
            then.status(200)
                .header("content-type", "application/json")
                .body(REPORT_BODY);
        })
        .await;

    let raw = client(&server, "secret-token").fetch(&query()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(raw.row_count(), 6);
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v4/reports:batchGet");
            then.status(403).body(r#"{"error": {"message": "User does not have access"}}"#);
        })
        .await;

    let err = client(&server, "t").fetch(&query()).await.unwrap_err();

    mock.assert_async().await;
    match err {
        ReportError::Api {
            status_code,
            message,
        } => {
            assert_eq!(status_code, Some(403));
            assert!(message.contains("does not have access"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v4/reports:batchGet");
            then.status(200).body("not json");
        })
        .await;

    let err = client(&server, "t").fetch(&query()).await.unwrap_err();
    assert!(matches!(err, ReportError::Serialization(_)));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_cached() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=refresh-me");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token": "new-token", "expires_in": 3600, "token_type": "Bearer"}"#);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("token.json"), dir.path().join("secrets.json"));
    store
        .save_cache(&CachedToken {
            access_token: "stale".into(),
            refresh_token: Some("refresh-me".into()),
            token_expiry: Some(Utc::now() - Duration::minutes(5)),
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            token_uri: Some(server.url("/token")),
        })
        .unwrap();

    assert_eq!(store.access_token().await.unwrap(), "new-token");
    token_mock.assert_async().await;

    let cached = store.load_cache().unwrap();
    assert_eq!(cached.access_token, "new-token");
    assert_eq!(cached.refresh_token.as_deref(), Some("refresh-me"));
    assert!(cached.is_fresh(Utc::now()));
}

#[tokio::test]
async fn test_refresh_falls_back_to_client_secrets_file() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("client_id=from-file");
            then.status(200)
                .body(r#"{"access_token": "file-token", "expires_in": 3600}"#);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let secrets = dir.path().join("secrets.json");
    std::fs::write(
        &secrets,
        format!(
            r#"{{"installed": {{"client_id": "from-file", "client_secret": "s", "token_uri": "{}"}}}}"#,
            server.url("/token")
        ),
    )
    .unwrap();

    let store = CredentialStore::new(dir.path().join("token.json"), &secrets);
    store
        .save_cache(&CachedToken {
            access_token: "stale".into(),
            refresh_token: Some("r".into()),
            token_expiry: Some(Utc::now() - Duration::minutes(5)),
            client_id: None,
            client_secret: None,
            token_uri: None,
        })
        .unwrap();

    assert_eq!(store.access_token().await.unwrap(), "file-token");
    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_refresh_is_auth_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(400).body(r#"{"error": "invalid_grant"}"#);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("token.json"), dir.path().join("none.json"));
    store
        .save_cache(&CachedToken {
            access_token: "stale".into(),
            refresh_token: Some("r".into()),
            token_expiry: Some(Utc::now() - Duration::minutes(5)),
            client_id: Some("id".into()),
            client_secret: Some("s".into()),
            token_uri: Some(server.url("/token")),
        })
        .unwrap();

    let err = store.access_token().await.unwrap_err();
    assert!(matches!(err, ReportError::Auth { .. }));
    assert!(err.to_string().contains("400"));
}
