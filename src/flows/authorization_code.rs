//! Authorization Code Flow
//!
//! Bullhorn's headless variant of RFC 6749 Section 4.1: the username and
//! password are posted to the authorize endpoint, which answers with a
//! redirect carrying the code. The code is then exchanged for tokens.

use secrecy::ExposeSecret;
use std::sync::Arc;

use url::Url;

use crate::core::urls::{query_value, resolve, with_query};
use crate::core::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{
    create_error_from_response, error_message, AuthError, BullhornError, ProtocolError,
};
use crate::types::{BullhornConfig, Credential, GrantType, TokenPair};

/// Redirect hops followed while looking for the authorization code.
pub const MAX_AUTHORIZE_REDIRECTS: usize = 5;

enum Authorize {
    Code(String),
    Redirect(Url),
}

/// Authorization-code issue flow.
pub struct AuthorizationCodeFlow<T: HttpTransport> {
    config: BullhornConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> AuthorizationCodeFlow<T> {
    /// Create new Authorization Code Flow.
    pub fn new(config: BullhornConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// Obtain an authorization code with the credential's username and password.
    ///
    /// Redirects without a code (a bounce to a regional auth host) are followed
    /// with the same POST, up to [`MAX_AUTHORIZE_REDIRECTS`] hops.
    pub async fn request_code(&self, credential: &Credential) -> Result<String, BullhornError> {
        let mut url = with_query(
            &self.config.provider.authorization_endpoint,
            [
                ("client_id", credential.client_id()),
                ("response_type", "code"),
            ],
        )?;

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", credential.username())
            .append_pair("password", credential.password().expose_secret())
            .append_pair("action", "Login")
            .finish();

        for _ in 0..=MAX_AUTHORIZE_REDIRECTS {
            let request = HttpRequest::new(HttpMethod::Post, url.clone())
                .form_body(body.clone())
                .timeout(Some(self.config.timeout));

            let response = self.transport.send(request).await?;
            match Self::code_from_response(&url, &response)? {
                Authorize::Code(code) => return Ok(code),
                Authorize::Redirect(next) => {
                    tracing::debug!(
                        status = response.status,
                        host = next.host_str(),
                        "Following authorize redirect"
                    );
                    url = next.to_string();
                }
            }
        }

        Err(AuthError::AuthDenied {
            status: None,
            message: format!("more than {MAX_AUTHORIZE_REDIRECTS} authorization redirects"),
        }
        .into())
    }

    fn code_from_response(url: &str, response: &HttpResponse) -> Result<Authorize, BullhornError> {
        if response.is_redirect() {
            let location = response.header("location").ok_or_else(|| ProtocolError::MissingField {
                field: "Location".to_string(),
            })?;
            let target = resolve(url, location)?;
            if let Some(code) = query_value(&target, "code") {
                return Ok(Authorize::Code(code));
            }
            if let Some(error) = query_value(&target, "error") {
                return Err(AuthError::AuthDenied {
                    status: Some(response.status),
                    message: query_value(&target, "error_description").unwrap_or(error),
                }
                .into());
            }
            return Ok(Authorize::Redirect(target));
        }

        if response.status >= 500 {
            return Err(create_error_from_response(response.status, &response.body));
        }

        // Anything else is the login form coming back: the credentials were refused.
        Err(AuthError::AuthDenied {
            status: Some(response.status),
            message: error_message(&response.body)
                .unwrap_or_else(|| "username or password rejected".to_string()),
        }
        .into())
    }

    /// Exchange an authorization code for an access/refresh token pair.
    pub async fn exchange_code(
        &self,
        credential: &Credential,
        code: &str,
    ) -> Result<TokenPair, BullhornError> {
        let url = with_query(
            &self.config.provider.token_endpoint,
            [
                ("grant_type", GrantType::AuthorizationCode.as_str()),
                ("code", code),
                ("client_id", credential.client_id()),
                ("client_secret", credential.client_secret().expose_secret().as_str()),
            ],
        )?;

        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("accept", "application/json")
            .timeout(Some(self.config.timeout));

        let response = self.transport.send(request).await?;

        match response.status {
            200 => response.json(),
            400 | 401 | 403 => Err(AuthError::AuthDenied {
                status: Some(response.status),
                message: error_message(&response.body)
                    .unwrap_or_else(|| "authorization code rejected".to_string()),
            }
            .into()),
            status => Err(create_error_from_response(status, &response.body)),
        }
    }

    /// Run both steps: request a code and exchange it.
    pub async fn issue(&self, credential: &Credential) -> Result<TokenPair, BullhornError> {
        let code = self.request_code(credential).await?;
        self.exchange_code(credential, &code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::urls::query_param;
    use crate::core::MockHttpTransport;
    use serde_json::json;

    fn flow(transport: Arc<MockHttpTransport>) -> AuthorizationCodeFlow<MockHttpTransport> {
        AuthorizationCodeFlow::new(BullhornConfig::default(), transport)
    }

    fn credential() -> Credential {
        Credential::new("client", "s3cret", "api.user", "p&ss word")
    }

    #[tokio::test]
    async fn test_issue_reads_code_from_redirect() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_redirect("https://www.bullhorn.com/?code=22%3Aabc-123&client_id=client");
        transport.queue_json_response(
            200,
            &json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "token_type": "Bearer",
                "expires_in": 600
            }),
        );

        let tokens = flow(transport.clone()).issue(&credential()).await.unwrap();
        assert_eq!(tokens.access_token, "access-1");
        assert_eq!(tokens.refresh_token, "refresh-1");

        let requests = transport.get_requests();
        assert_eq!(requests.len(), 2);

        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(query_param(&requests[0].url, "response_type"), Some("code".to_string()));
        let form = requests[0].body.clone().unwrap();
        assert!(form.contains("username=api.user"));
        assert!(form.contains("password=p%26ss+word"));
        assert!(form.contains("action=Login"));

        assert_eq!(query_param(&requests[1].url, "code"), Some("22:abc-123".to_string()));
        assert_eq!(
            query_param(&requests[1].url, "grant_type"),
            Some("authorization_code".to_string())
        );
        assert_eq!(query_param(&requests[1].url, "client_secret"), Some("s3cret".to_string()));
    }

    #[tokio::test]
    async fn test_login_form_returned_means_denied() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_text_response(200, "<html>Invalid credentials</html>");

        let result = flow(transport.clone()).issue(&credential()).await;
        assert!(matches!(
            result,
            Err(BullhornError::Auth(AuthError::AuthDenied { status: Some(200), .. }))
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_redirect_with_error() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_redirect("https://www.bullhorn.com/?error=access_denied");

        let result = flow(transport).request_code(&credential()).await;
        match result {
            Err(BullhornError::Auth(AuthError::AuthDenied { message, .. })) => {
                assert_eq!(message, "access_denied")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_rejected() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            400,
            &json!({"error": "invalid_grant", "error_description": "Invalid authorization code"}),
        );

        let result = flow(transport).exchange_code(&credential(), "stale").await;
        match result {
            Err(BullhornError::Auth(AuthError::AuthDenied { message, .. })) => {
                assert_eq!(message, "Invalid authorization code")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_denial() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_text_response(503, "maintenance");

        let result = flow(transport).request_code(&credential()).await;
        assert!(matches!(result, Err(BullhornError::Request { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_follows_redirect_to_regional_auth_host() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 307,
            headers: [(
                "location".to_string(),
                "https://auth-west.bullhornstaffing.com/oauth/authorize?client_id=c".to_string(),
            )]
            .into_iter()
            .collect(),
            body: String::new(),
        });
        transport.queue_redirect("?code=22%3Aabc");

        let code = flow(transport.clone()).request_code(&credential()).await.unwrap();
        assert_eq!(code, "22:abc");

        let requests = transport.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, HttpMethod::Post);
        assert!(requests[1]
            .url
            .starts_with("https://auth-west.bullhornstaffing.com/oauth/authorize?"));
        assert_eq!(requests[1].body, requests[0].body);
    }

    #[tokio::test]
    async fn test_relative_location_carries_code() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_redirect("/oauth/done?code=22%3Aabc");

        let code = flow(transport.clone()).request_code(&credential()).await.unwrap();
        assert_eq!(code, "22:abc");
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_redirect_loop_is_capped() {
        let transport = Arc::new(MockHttpTransport::new());
        for _ in 0..=MAX_AUTHORIZE_REDIRECTS {
            transport.queue_redirect("/oauth/authorize?client_id=client");
        }

        let result = flow(transport.clone()).request_code(&credential()).await;
        assert!(matches!(
            result,
            Err(BullhornError::Auth(AuthError::AuthDenied { status: None, .. }))
        ));
        assert_eq!(transport.request_count(), MAX_AUTHORIZE_REDIRECTS + 1);
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse {
            status: 302,
            headers: Default::default(),
            body: String::new(),
        });

        let result = flow(transport).request_code(&credential()).await;
        assert!(matches!(
            result,
            Err(BullhornError::Protocol(ProtocolError::MissingField { .. }))
        ));
    }
}
