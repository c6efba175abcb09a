//! Request Dispatcher
//!
//! Sends REST calls under the current session and runs at most one renewal
//! cycle per logical call.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::core::urls::{append_query, join_path};
use crate::core::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{create_error_from_response, AuthError, BullhornError, ProtocolError};
use crate::token::TokenManager;
use crate::types::{BullhornConfig, Credential, SessionState};

/// Renewal cycles allowed for one logical call.
pub const MAX_AUTH_RETRIES: u32 = 1;

/// Per-call request shape: query string, JSON body and deadline.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the configured timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.query.extend(pairs);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Authenticated request dispatcher.
///
/// Owns the live credential. The lock is held for a whole dispatch so two
/// calls failing together trigger one renewal, not two.
pub struct RequestDispatcher<T: HttpTransport, M: TokenManager> {
    config: BullhornConfig,
    transport: Arc<T>,
    manager: Arc<M>,
    credential: Mutex<Credential>,
}

impl<T: HttpTransport, M: TokenManager> RequestDispatcher<T, M> {
    pub fn new(
        config: BullhornConfig,
        transport: Arc<T>,
        manager: Arc<M>,
        credential: Credential,
    ) -> Self {
        Self {
            config,
            transport,
            manager,
            credential: Mutex::new(credential),
        }
    }

    pub fn config(&self) -> &BullhornConfig {
        &self.config
    }

    /// Snapshot of the live credential.
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    /// Run a renewal cycle unconditionally.
    pub async fn renew(&self) -> Result<(), BullhornError> {
        let mut credential = self.credential.lock().await;
        self.manager.renew(&mut credential).await
    }

    /// Send `method` to `{restUrl}/{segments...}`.
    ///
    /// A 401 triggers one renewal and one resend; a second 401 is
    /// `AuthFailure`. Other error statuses come back as `Request` untouched.
    pub async fn dispatch<I, S>(
        &self,
        method: HttpMethod,
        segments: I,
        options: RequestOptions,
    ) -> Result<HttpResponse, BullhornError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let path = segments.join("/");

        let mut credential = self.credential.lock().await;
        let mut retries = 0;

        loop {
            if credential.state() != SessionState::SessionActive {
                if retries >= MAX_AUTH_RETRIES {
                    return Err(AuthError::NotAuthenticated.into());
                }
                tracing::warn!(path = %path, "No active session, renewing before dispatch");
                self.manager.renew(&mut credential).await?;
                retries += 1;
                continue;
            }

            // Resolved per attempt: renewal may move the session to another host.
            let request = self.build_request(&credential, method, &segments, &options)?;
            tracing::debug!(method = %method, path = %path, attempt = retries + 1, "Dispatching");

            let response = self.transport.send(request).await?;

            if response.is_success() {
                return Ok(response);
            }

            if response.status == 401 {
                if retries >= MAX_AUTH_RETRIES {
                    tracing::error!(
                        method = %method,
                        path = %path,
                        "Still unauthorized after renewal"
                    );
                    return Err(AuthError::AuthFailure {
                        status: response.status,
                    }
                    .into());
                }
                tracing::warn!(method = %method, path = %path, "Session rejected, renewing");
                self.manager.renew(&mut credential).await?;
                retries += 1;
                continue;
            }

            tracing::error!(
                method = %method,
                path = %path,
                status = response.status,
                "Request failed"
            );
            return Err(create_error_from_response(response.status, &response.body));
        }
    }

    /// Send a request once under the current session, without renewal.
    pub(crate) async fn send_once(
        &self,
        method: HttpMethod,
        segments: &[String],
        options: &RequestOptions,
    ) -> Result<Option<HttpResponse>, BullhornError> {
        let credential = self.credential.lock().await;
        if credential.state() != SessionState::SessionActive {
            return Ok(None);
        }
        let request = self.build_request(&credential, method, segments, options)?;
        self.transport.send(request).await.map(Some)
    }

    fn build_request(
        &self,
        credential: &Credential,
        method: HttpMethod,
        segments: &[String],
        options: &RequestOptions,
    ) -> Result<HttpRequest, BullhornError> {
        let rest_url = credential.rest_url().ok_or(AuthError::NotAuthenticated)?;
        let url = append_query(join_path(rest_url, segments)?, options.query.iter().cloned());

        let mut request = HttpRequest::new(method, url.to_string())
            .header("accept", "application/json")
            .timeout(options.timeout.or(Some(self.config.timeout)));

        for (name, value) in credential.session_headers()? {
            request = request.header(name, value);
        }

        if let Some(body) = &options.body {
            let encoded = serde_json::to_string(body).map_err(ProtocolError::json)?;
            request = request.json_body(encoded);
        }

        Ok(request)
    }
}
