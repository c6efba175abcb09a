//! Session Login
//!
//! Trades an OAuth access token for a REST URL and session token.

use std::sync::Arc;

use crate::core::urls::with_query;
use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, error_message, AuthError, BullhornError};
use crate::types::{BullhornConfig, Credential, RestSession};

/// REST session login flow.
pub struct SessionLoginFlow<T: HttpTransport> {
    config: BullhornConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> SessionLoginFlow<T> {
    /// Create new login flow.
    pub fn new(config: BullhornConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// Log in with the credential's access token.
    pub async fn login(&self, credential: &Credential) -> Result<RestSession, BullhornError> {
        let access_token = credential.access_token().ok_or(AuthError::NotAuthenticated)?;

        let url = with_query(
            &self.config.provider.login_endpoint,
            [
                ("version", self.config.api_version.as_str()),
                ("access_token", access_token),
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
                    .unwrap_or_else(|| "access token rejected at login".to_string()),
            }
            .into()),
            status => Err(create_error_from_response(status, &response.body)),
        }
    }
}
