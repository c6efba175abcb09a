//! Bullhorn Client
//!
//! High-level client combining the dispatcher, token lifecycle and the
//! entity, search and event services.

mod dispatcher;

pub use dispatcher::{RequestDispatcher, RequestOptions, MAX_AUTH_RETRIES};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::core::{HttpMethod, HttpResponse, HttpTransport, ReqwestHttpTransport};
use crate::error::{create_error_from_response, BullhornError};
use crate::services::{EntityService, EventService, SearchService};
use crate::token::{CredentialStore, DefaultTokenManager, FileCredentialStore, TokenManager};
use crate::types::{BullhornConfig, Credential};

/// Bullhorn REST client.
pub struct BullhornClient<
    T: HttpTransport = ReqwestHttpTransport,
    M: TokenManager = DefaultTokenManager<ReqwestHttpTransport, FileCredentialStore>,
> {
    dispatcher: RequestDispatcher<T, M>,
}

impl<S: CredentialStore>
    BullhornClient<ReqwestHttpTransport, DefaultTokenManager<ReqwestHttpTransport, S>>
{
    /// Load the credential from `store`, build the default transport and
    /// make sure a live session exists.
    pub async fn connect(config: BullhornConfig, store: S) -> Result<Self, BullhornError> {
        let transport = Arc::new(ReqwestHttpTransport::with_options(
            config.timeout,
            config.max_response_size,
        )?);
        Self::connect_with(config, transport, Arc::new(store)).await
    }
}

impl<T: HttpTransport, S: CredentialStore> BullhornClient<T, DefaultTokenManager<T, S>> {
    /// Like [`BullhornClient::connect`] with a caller-supplied transport.
    pub async fn connect_with(
        config: BullhornConfig,
        transport: Arc<T>,
        store: Arc<S>,
    ) -> Result<Self, BullhornError> {
        let credential = store.load().await?;
        let manager = Arc::new(DefaultTokenManager::new(
            config.clone(),
            transport.clone(),
            store,
        ));
        let client = Self::with_components(config, transport, manager, credential);
        client.authenticate().await?;
        Ok(client)
    }
}

impl<T: HttpTransport, M: TokenManager> BullhornClient<T, M> {
    /// Create a client with custom implementations. No network call is made.
    pub fn with_components(
        config: BullhornConfig,
        transport: Arc<T>,
        manager: Arc<M>,
        credential: Credential,
    ) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(config, transport, manager, credential),
        }
    }

    pub fn config(&self) -> &BullhornConfig {
        self.dispatcher.config()
    }

    /// Snapshot of the current credential.
    pub async fn credential(&self) -> Credential {
        self.dispatcher.credential().await
    }

    // ========== Services ==========

    /// Entity CRUD and to-many relations.
    pub fn entity(&self) -> EntityService<'_, T, M> {
        EntityService::new(self)
    }

    /// `query/` and `search/` endpoints.
    pub fn search(&self) -> SearchService<'_, T, M> {
        SearchService::new(self)
    }

    /// Event subscription polling.
    pub fn events(&self) -> EventService<'_, T, M> {
        EventService::new(self)
    }

    // ========== Session ==========

    /// Session expiry reported by `ping`.
    ///
    /// `None` when there is no session or the server no longer accepts it.
    /// Never triggers a renewal.
    pub async fn ping(&self) -> Result<Option<DateTime<Utc>>, BullhornError> {
        let segments = ["ping".to_string()];
        let response = match self
            .dispatcher
            .send_once(HttpMethod::Get, &segments, &RequestOptions::new())
            .await?
        {
            Some(response) => response,
            None => return Ok(None),
        };

        if response.status == 401 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(create_error_from_response(response.status, &response.body));
        }

        let body: Value = response.json()?;
        let millis = match &body["sessionExpires"] {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }

    /// Ensure a live session, renewing when it is missing or expired.
    pub async fn authenticate(&self) -> Result<(), BullhornError> {
        match self.ping().await? {
            Some(expires) if expires > Utc::now() => {
                tracing::debug!(%expires, "Existing session still valid");
                Ok(())
            }
            _ => {
                tracing::info!("No valid session, renewing");
                self.dispatcher.renew().await
            }
        }
    }

    /// Force a renewal cycle.
    pub async fn renew(&self) -> Result<(), BullhornError> {
        self.dispatcher.renew().await
    }

    // ========== Raw requests ==========

    /// Dispatch a request relative to the session's REST URL.
    pub async fn dispatch<I, P>(
        &self,
        method: HttpMethod,
        segments: I,
        options: RequestOptions,
    ) -> Result<HttpResponse, BullhornError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.dispatcher.dispatch(method, segments, options).await
    }

    /// Dispatch and decode the JSON response body.
    pub async fn request_json<R, I, P>(
        &self,
        method: HttpMethod,
        segments: I,
        options: RequestOptions,
    ) -> Result<R, BullhornError>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.dispatch(method, segments, options).await?.json()
    }
}
