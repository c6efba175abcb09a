//! Token Refresh
//!
//! RFC 6749 Section 6 against Bullhorn's token endpoint.

use secrecy::ExposeSecret;
use std::sync::Arc;

use crate::core::urls::with_query;
use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, AuthError, BullhornError};
use crate::types::{BullhornConfig, Credential, GrantType, TokenPair};

/// Whether a token-endpoint status means the refresh token itself is no good.
///
/// Client errors qualify, except timeouts and throttling which say nothing
/// about the token.
pub fn is_refresh_rejection(status: u16) -> bool {
    (400..500).contains(&status) && !matches!(status, 408 | 429)
}

/// Refresh-token grant flow.
pub struct RefreshFlow<T: HttpTransport> {
    config: BullhornConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> RefreshFlow<T> {
    /// Create new refresh flow.
    pub fn new(config: BullhornConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// Exchange the credential's refresh token for a new token pair.
    pub async fn refresh(&self, credential: &Credential) -> Result<TokenPair, BullhornError> {
        let refresh_token = credential.refresh_token().ok_or(AuthError::RefreshRejected {
            status: 400,
            body: "no refresh token available".to_string(),
        })?;

        let url = with_query(
            &self.config.provider.token_endpoint,
            [
                ("grant_type", GrantType::RefreshToken.as_str()),
                ("refresh_token", refresh_token),
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
            status if is_refresh_rejection(status) => Err(AuthError::RefreshRejected {
                status,
                body: response.body,
            }
            .into()),
            status => Err(create_error_from_response(status, &response.body)),
        }
    }
}
