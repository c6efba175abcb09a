//! Session lifecycle against a mock Bullhorn server.

use super::*;
use integrations_bullhorn::{
    AuthError, BullhornError, EntityResponse, QueryOptions, SessionState,
};
use wiremock::matchers::header;

#[tokio::test]
async fn test_connect_without_tokens_issues_logs_in_and_persists() {
    let harness = Harness::start(None).await;
    harness.mount_issue("1", 1).await;
    harness.mount_login("session-1", 1).await;

    let client = BullhornClient::connect_with(
        harness.config(),
        Arc::new(ReqwestHttpTransport::new().unwrap()),
        harness.store.clone(),
    )
    .await
    .unwrap();

    let credential = client.credential().await;
    assert_eq!(credential.state(), SessionState::SessionActive);
    assert_eq!(credential.rest_url(), Some(rest_url(&harness.server).as_str()));

    let saved = harness.saved();
    assert_eq!(saved["BhRestToken"], "session-1");
    assert_eq!(saved["access_token"], "access-1");
    assert_eq!(saved["refresh_token"], "refresh-1");
    assert_eq!(saved["password"], "hunter2");
    assert_eq!(saved["note"], "kept across saves");
}

#[tokio::test]
async fn test_connect_keeps_live_session() {
    let harness = Harness::start(Some("live")).await;
    let expires = chrono::Utc::now().timestamp_millis() + 300_000;
    Mock::given(method("GET"))
        .and(path(rest_path("ping")))
        .and(header("BhRestToken", "live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionExpires": expires})))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh("unused", 0).await;

    let client = BullhornClient::connect_with(
        harness.config(),
        Arc::new(ReqwestHttpTransport::new().unwrap()),
        harness.store.clone(),
    )
    .await
    .unwrap();

    assert_eq!(client.credential().await.rest_token(), Some("live"));
}

#[tokio::test]
async fn test_unauthorized_once_renews_and_retries() {
    let harness = Harness::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path(rest_path("entity/Candidate/1")))
        .and(header("BhRestToken", "stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorMessage": "Bad 'BhRestToken' or timed-out."
        })))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("entity/Candidate/1")))
        .and(header("BhRestToken", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 1, "firstName": "Ada"}
        })))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh("2", 1).await;
    harness.mount_login("fresh", 1).await;

    let client = harness.client().await;
    let response: EntityResponse = client
        .entity()
        .read("Candidate", 1i64, &QueryOptions::new().fields(["id", "firstName"]))
        .await
        .unwrap();
    assert_eq!(response.data["firstName"], "Ada");

    let requests = harness.server.received_requests().await.unwrap();
    let entity_calls = requests
        .iter()
        .filter(|r| r.url.path().ends_with("/entity/Candidate/1"))
        .count();
    assert_eq!(entity_calls, 2);

    let saved = harness.saved();
    assert_eq!(saved["BhRestToken"], "fresh");
    assert_eq!(saved["refresh_token"], "refresh-2");
}

#[tokio::test]
async fn test_unauthorized_twice_is_auth_failure() {
    let harness = Harness::start(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path(rest_path("entity/Candidate/1")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&harness.server)
        .await;
    harness.mount_refresh("2", 1).await;
    harness.mount_login("fresh", 1).await;

    let client = harness.client().await;
    let error = client
        .entity()
        .read::<serde_json::Value>("Candidate", 1i64, &QueryOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, BullhornError::Auth(AuthError::AuthFailure { status: 401 })));
}

#[tokio::test]
async fn test_rejected_refresh_falls_back_to_issue() {
    let harness = Harness::start(Some("stale")).await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid, expired, or revoked refresh token."
        })))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_issue("3", 1).await;
    harness.mount_login("fresh", 1).await;
    Mock::given(method("GET"))
        .and(path(rest_path("entity/Note/5")))
        .and(header("BhRestToken", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("entity/Note/5")))
        .and(header("BhRestToken", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 5}})))
        .expect(1)
        .mount(&harness.server)
        .await;

    let client = harness.client().await;
    let response: EntityResponse = client
        .entity()
        .read("Note", 5i64, &QueryOptions::new())
        .await
        .unwrap();
    assert_eq!(response.data["id"], 5);

    let saved = harness.saved();
    assert_eq!(saved["refresh_token"], "refresh-3");
    assert_eq!(saved["BhRestToken"], "fresh");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let harness = Harness::start(Some("live")).await;
    Mock::given(method("DELETE"))
        .and(path(rest_path("entity/Note/9")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"errorMessage": "boom"})))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh("unused", 0).await;

    let client = harness.client().await;
    let error = client.entity().delete("Note", 9).await.unwrap_err();

    match error {
        BullhornError::Request { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
