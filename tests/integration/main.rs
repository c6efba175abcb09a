//! Integration tests using WireMock
//!
//! These drive the full stack (reqwest transport, file credential store,
//! token manager, dispatcher) against a mock Bullhorn server.

mod services;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use integrations_bullhorn::{
    BullhornClient, BullhornConfig, CredentialStore, DefaultTokenManager, FileCredentialStore,
    ReqwestHttpTransport,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestManager = DefaultTokenManager<ReqwestHttpTransport, FileCredentialStore>;
pub type TestClient = BullhornClient<ReqwestHttpTransport, TestManager>;

/// Mock server plus a credential file in a scratch directory.
pub struct Harness {
    pub server: MockServer,
    pub store: Arc<FileCredentialStore>,
    _dir: TempDir,
}

impl Harness {
    /// Start a server and write `credential` (with `restUrl` pointing at it
    /// when `session_token` is set) to a fresh credential file.
    pub async fn start(session_token: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("auth.json");

        let mut credential = json!({
            "client_id": "client",
            "client_secret": "secret",
            "username": "api.user",
            "password": "hunter2",
            "note": "kept across saves"
        });
        if let Some(token) = session_token {
            credential["access_token"] = json!("access-0");
            credential["refresh_token"] = json!("refresh-0");
            credential["restUrl"] = json!(rest_url(&server));
            credential["BhRestToken"] = json!(token);
        }
        std::fs::write(&path, serde_json::to_vec_pretty(&credential).unwrap()).unwrap();

        Self {
            server,
            store: Arc::new(FileCredentialStore::new(path)),
            _dir: dir,
        }
    }

    pub fn config(&self) -> BullhornConfig {
        BullhornConfig::builder()
            .base_url(self.server.uri())
            .build()
            .unwrap()
    }

    /// Client built from the stored credential without the initial ping.
    pub async fn client(&self) -> TestClient {
        let config = self.config();
        let transport = Arc::new(ReqwestHttpTransport::new().unwrap());
        let credential = self.store.load().await.unwrap();
        let manager = Arc::new(DefaultTokenManager::new(
            config.clone(),
            transport.clone(),
            self.store.clone(),
        ));
        BullhornClient::with_components(config, transport, manager, credential)
    }

    /// The credential file as raw JSON.
    pub fn saved(&self) -> Value {
        let contents = std::fs::read_to_string(self.store.path()).unwrap();
        serde_json::from_str(&contents).unwrap()
    }

    pub async fn mount_refresh(&self, suffix: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": format!("access-{suffix}"),
                "refresh_token": format!("refresh-{suffix}"),
                "token_type": "Bearer",
                "expires_in": 600
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_issue(&self, suffix: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/authorize"))
            .and(query_param("response_type", "code"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "https://www.bullhorn.com/?code=22%3Aauth-code"),
            )
            .expect(times)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(query_param("grant_type", "authorization_code"))
            .and(query_param("code", "22:auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": format!("access-{suffix}"),
                "refresh_token": format!("refresh-{suffix}"),
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_login(&self, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/rest-services/login"))
            .and(query_param("version", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "BhRestToken": token,
                "restUrl": rest_url(&self.server)
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

pub fn rest_url(server: &MockServer) -> String {
    format!("{}/rest-services/1abc/", server.uri())
}

pub fn rest_path(rest: &str) -> String {
    format!("/rest-services/1abc/{rest}")
}
