//! Token Manager
//!
//! Drives the credential through its lifecycle:
//!
//! ```text
//! Unauthenticated --issue--> TokenIssued --login--> SessionActive
//!                              ^    |                    |
//!                              +----+--refresh-----------+
//! ```
//!
//! `renew` is the composite used after an authorization failure.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::core::HttpTransport;
use crate::error::{BullhornError, NetworkError};
use crate::flows::{AuthorizationCodeFlow, RefreshFlow, SessionLoginFlow};
use crate::token::CredentialStore;
use crate::types::{BullhornConfig, Credential, RestSession, TokenPair};

/// Token lifecycle interface.
///
/// `issue`, `refresh` and `login` mutate the credential in memory only;
/// `renew` is the one operation that persists.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Obtain a fresh access/refresh pair from username and password.
    async fn issue(&self, credential: &mut Credential) -> Result<(), BullhornError>;

    /// Replace the access/refresh pair using the current refresh token.
    async fn refresh(&self, credential: &mut Credential) -> Result<(), BullhornError>;

    /// Open a REST session with the current access token.
    async fn login(&self, credential: &mut Credential) -> Result<(), BullhornError>;

    /// Refresh (or issue when refresh is impossible), log in, then save once.
    async fn renew(&self, credential: &mut Credential) -> Result<(), BullhornError>;
}

/// Default token manager implementation.
pub struct DefaultTokenManager<T: HttpTransport, S: CredentialStore> {
    authorization: AuthorizationCodeFlow<T>,
    refresher: RefreshFlow<T>,
    session_login: SessionLoginFlow<T>,
    store: Arc<S>,
}

impl<T: HttpTransport, S: CredentialStore> DefaultTokenManager<T, S> {
    /// Create new token manager.
    pub fn new(config: BullhornConfig, transport: Arc<T>, store: Arc<S>) -> Self {
        Self {
            authorization: AuthorizationCodeFlow::new(config.clone(), transport.clone()),
            refresher: RefreshFlow::new(config.clone(), transport.clone()),
            session_login: SessionLoginFlow::new(config, transport),
            store,
        }
    }

    /// The backing credential store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[async_trait]
impl<T: HttpTransport, S: CredentialStore> TokenManager for DefaultTokenManager<T, S> {
    async fn issue(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        tracing::debug!(
            client_id = credential.client_id(),
            "Issuing tokens via authorization code"
        );
        let tokens = self.authorization.issue(credential).await?;
        credential.set_tokens(tokens);
        Ok(())
    }

    async fn refresh(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        tracing::debug!(client_id = credential.client_id(), "Refreshing tokens");
        let tokens = self.refresher.refresh(credential).await?;
        credential.set_tokens(tokens);
        Ok(())
    }

    async fn login(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        let session = self.session_login.login(credential).await?;
        tracing::info!(rest_url = %session.rest_url, "REST session opened");
        credential.set_session(session);
        Ok(())
    }

    async fn renew(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        if credential.refresh_token().is_some() {
            match self.refresh(credential).await {
                Ok(()) => {}
                Err(error) if error.is_refresh_rejected() => {
                    tracing::warn!(
                        status = ?error.status(),
                        "Refresh token rejected, falling back to authorization code"
                    );
                    self.issue(credential).await?;
                }
                Err(error) => return Err(error),
            }
        } else {
            self.issue(credential).await?;
        }

        self.login(credential).await?;
        self.store.save(credential).await?;
        tracing::info!(state = ?credential.state(), "Session renewed");
        Ok(())
    }
}

/// Mock token manager for testing.
///
/// Every successful `renew` installs a session with token `renewed-N`.
pub struct MockTokenManager {
    rest_url: String,
    renew_count: Mutex<usize>,
    next_error: Mutex<Option<BullhornError>>,
}

impl MockTokenManager {
    /// Create new mock token manager whose sessions point at `rest_url`.
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            rest_url: rest_url.into(),
            renew_count: Mutex::new(0),
            next_error: Mutex::new(None),
        }
    }

    /// Make the next lifecycle call fail.
    pub fn set_next_error(&self, error: BullhornError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Number of `renew` calls, failed ones included.
    pub fn renew_count(&self) -> usize {
        *self.renew_count.lock().unwrap()
    }

    fn check_error(&self) -> Result<(), BullhornError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl TokenManager for MockTokenManager {
    async fn issue(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        self.check_error()?;
        credential.set_tokens(TokenPair {
            access_token: "mock-access-token".to_string(),
            refresh_token: "mock-refresh-token".to_string(),
            token_type: None,
            expires_in: None,
        });
        Ok(())
    }

    async fn refresh(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        self.issue(credential).await
    }

    async fn login(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        self.check_error()?;
        if credential.access_token().is_none() {
            return Err(BullhornError::Network(NetworkError::ConnectionFailed {
                message: "mock login without access token".to_string(),
            }));
        }
        let count = *self.renew_count.lock().unwrap();
        credential.set_session(RestSession {
            rest_url: self.rest_url.clone(),
            rest_token: format!("renewed-{}", count),
        });
        Ok(())
    }

    async fn renew(&self, credential: &mut Credential) -> Result<(), BullhornError> {
        *self.renew_count.lock().unwrap() += 1;
        self.refresh(credential).await?;
        self.login(credential).await
    }
}
