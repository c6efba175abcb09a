//! Credential Types
//!
//! The persisted identity record and the token/session values produced by
//! each lifecycle transition.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::core::SESSION_HEADER;
use crate::error::{AuthError, BullhornError, ConfigurationError};

/// Lifecycle state derived from which fields a credential currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No access or refresh token.
    Unauthenticated,
    /// Access/refresh tokens present, no REST session.
    TokenIssued,
    /// REST URL and session token present.
    SessionActive,
}

/// Access/refresh token pair returned by the token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// REST session returned by the login endpoint.
///
/// The token is only meaningful against the URL it was issued with.
#[derive(Clone, Deserialize)]
pub struct RestSession {
    #[serde(rename = "restUrl")]
    pub rest_url: String,
    #[serde(rename = "BhRestToken")]
    pub rest_token: String,
}

impl std::fmt::Debug for RestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSession")
            .field("rest_url", &self.rest_url)
            .field("rest_token", &"[REDACTED]")
            .finish()
    }
}

/// One authenticated identity against Bullhorn.
///
/// Static fields come from the operator; token and session fields are only
/// ever replaced in pairs through [`Credential::set_tokens`] and
/// [`Credential::set_session`].
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    client_id: String,
    #[serde(default = "empty_secret", serialize_with = "expose")]
    client_secret: SecretString,
    #[serde(default)]
    username: String,
    #[serde(default = "empty_secret", serialize_with = "expose")]
    password: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(
        rename = "restUrl",
        alias = "sessionUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    rest_url: Option<String>,
    #[serde(
        rename = "BhRestToken",
        alias = "sessionToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    rest_token: Option<String>,
    /// Keys this crate does not know about, kept so a save does not drop them.
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Credential {
    /// Create a credential from operator-supplied static fields.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            username: username.into(),
            password: SecretString::new(password.into()),
            access_token: None,
            refresh_token: None,
            rest_url: None,
            rest_token: None,
            extra: HashMap::new(),
        }
    }

    /// Check that every static field is present.
    pub fn validate(&self) -> Result<(), BullhornError> {
        let fields = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret().as_str()),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingRequired {
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// REST base URL of the current session.
    pub fn rest_url(&self) -> Option<&str> {
        self.rest_url.as_deref()
    }

    /// Current session token.
    pub fn rest_token(&self) -> Option<&str> {
        self.rest_token.as_deref()
    }

    /// Unknown fields carried over from the credential source.
    pub fn extra(&self) -> &HashMap<String, serde_json::Value> {
        &self.extra
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.rest_url.is_some() && self.rest_token.is_some() {
            SessionState::SessionActive
        } else if self.access_token.is_some() {
            SessionState::TokenIssued
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Replace the access/refresh token pair.
    ///
    /// New OAuth tokens invalidate the previous REST session, so it is
    /// cleared until the next login.
    pub fn set_tokens(&mut self, tokens: TokenPair) {
        self.access_token = Some(tokens.access_token);
        self.refresh_token = Some(tokens.refresh_token);
        self.clear_session();
    }

    /// Replace the REST session (URL and token together).
    pub fn set_session(&mut self, session: RestSession) {
        self.rest_url = Some(session.rest_url);
        self.rest_token = Some(session.rest_token);
    }

    /// Drop the REST session.
    pub fn clear_session(&mut self) {
        self.rest_url = None;
        self.rest_token = None;
    }

    /// Headers that authenticate a REST call.
    pub fn session_headers(&self) -> Result<HashMap<String, String>, BullhornError> {
        let token = self
            .rest_token
            .as_ref()
            .ok_or(BullhornError::Auth(AuthError::NotAuthenticated))?;
        let mut headers = HashMap::new();
        headers.insert(SESSION_HEADER.to_string(), token.clone());
        Ok(headers)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("rest_url", &self.rest_url)
            .field("rest_token", &redact(&self.rest_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(600),
        }
    }

    fn session(url: &str, token: &str) -> RestSession {
        RestSession {
            rest_url: url.to_string(),
            rest_token: token.to_string(),
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut credential = Credential::new("id", "secret", "user", "pass");
        assert_eq!(credential.state(), SessionState::Unauthenticated);

        credential.set_tokens(tokens("a1", "r1"));
        assert_eq!(credential.state(), SessionState::TokenIssued);

        credential.set_session(session(
            "https://rest9.bullhornstaffing.com/rest-services/abc/",
            "s1",
        ));
        assert_eq!(credential.state(), SessionState::SessionActive);

        credential.set_tokens(tokens("a2", "r2"));
        assert_eq!(credential.state(), SessionState::TokenIssued);
        assert!(credential.rest_url().is_none());
        assert!(credential.rest_token().is_none());
    }

    #[test]
    fn test_session_headers() {
        let mut credential = Credential::new("id", "secret", "user", "pass");
        let error = credential.session_headers().unwrap_err();
        assert_eq!(error.error_code(), "BULLHORN_NOT_AUTHENTICATED");

        credential.set_tokens(tokens("a1", "r1"));
        credential.set_session(session("https://rest.example.com/", "s1"));
        let headers = credential.session_headers().unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("BhRestToken"), Some(&"s1".to_string()));
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let credential = Credential::new("id", "secret", "", "pass");
        match credential.validate() {
            Err(BullhornError::Configuration(ConfigurationError::MissingRequired { field })) => {
                assert_eq!(field, "username")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(Credential::new("id", "secret", "user", "pass").validate().is_ok());
    }

    #[test]
    fn test_json_uses_wire_keys_and_keeps_unknown_fields() {
        let json = r#"{
            "client_id": "id",
            "client_secret": "secret",
            "username": "user",
            "password": "pass",
            "access_token": "a1",
            "refresh_token": "r1",
            "sessionUrl": "https://rest.example.com/",
            "sessionToken": "s1",
            "corporation": 42
        }"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.state(), SessionState::SessionActive);
        assert_eq!(credential.rest_url(), Some("https://rest.example.com/"));
        assert_eq!(credential.extra().get("corporation"), Some(&serde_json::json!(42)));

        let saved = serde_json::to_value(&credential).unwrap();
        assert_eq!(saved["client_secret"], "secret");
        assert_eq!(saved["restUrl"], "https://rest.example.com/");
        assert_eq!(saved["BhRestToken"], "s1");
        assert_eq!(saved["corporation"], 42);
        assert!(saved.get("sessionUrl").is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut credential = Credential::new("id", "top-secret", "user", "hunter2");
        credential.set_tokens(tokens("access-value", "refresh-value"));
        let debug = format!("{credential:?}");
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("access-value"));
        assert!(debug.contains("user"));
    }
}
