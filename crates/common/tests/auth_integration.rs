//! Integration tests for the refresh client and coordinator over HTTP.
//!
//! Exercises the production `RefreshClient` against a wiremock server,
//! including the single-flight property at the network boundary.

use std::sync::Arc;
use std::time::Duration;

use tokengate_common::auth::types::keys;
use tokengate_common::auth::{
    AuthError, CredentialStore, RefreshApi, RefreshClient, RefreshCoordinator,
};
use tokengate_common::testing::MemoryCredentialStore;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn refresh_client(server: &MockServer) -> RefreshClient {
    RefreshClient::new(format!("{}/refresh/", server.uri()), TIMEOUT)
}

#[tokio::test]
async fn test_refresh_client_posts_token_and_returns_new_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .and(body_json(serde_json::json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": true,
            "access_token": "fresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = refresh_client(&server);
    let token = client.refresh_access_token("refresh-1").await.unwrap();
    assert_eq!(token, "fresh");
}

#[tokio::test]
async fn test_refresh_client_rejects_status_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": false})),
        )
        .mount(&server)
        .await;

    let client = refresh_client(&server);
    let result = client.refresh_access_token("refresh-1").await;
    assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
}

#[tokio::test]
async fn test_refresh_client_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = refresh_client(&server);
    let result = client.refresh_access_token("refresh-1").await;
    assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
}

#[tokio::test]
async fn test_refresh_client_rejects_non_boolean_status() {
    let server = MockServer::start().await;

    // A malformed status flag is treated identically to a network failure.
    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "yes",
            "access_token": "fresh"
        })))
        .mount(&server)
        .await;

    let client = refresh_client(&server);
    let result = client.refresh_access_token("refresh-1").await;
    assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
}

#[tokio::test]
async fn test_refresh_client_maps_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = refresh_client(&server);
    let result = client.refresh_access_token("refresh-1").await;
    assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
}

/// Single-flight verified at the HTTP boundary: four concurrent callers,
/// one slow refresh request on the wire.
#[tokio::test(flavor = "multi_thread")]
async fn test_coordinator_single_flight_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "status": true,
                    "access_token": "fresh"
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_session("stale", "refresh-1"));
    let client = Arc::new(refresh_client(&server));
    let coordinator = Arc::new(RefreshCoordinator::new(store.clone(), client));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move { coordinator.ensure_refreshed().await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok("fresh".to_string()));
    }

    assert_eq!(store.get(keys::ACCESS_TOKEN).await.as_deref(), Some("fresh"));
    // expect(1) is verified when the mock server drops.
}
