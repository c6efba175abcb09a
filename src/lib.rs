//! Bullhorn REST Integration
//!
//! Authenticated access to the Bullhorn REST API: entity CRUD, to-many
//! relations, query/search and event subscription polling, on top of a
//! session layer that renews itself when the server stops accepting it.
//!
//! # Session lifecycle
//!
//! - **Issue**: username/password → authorization code → access/refresh tokens
//! - **Refresh**: refresh token → new token pair (falls back to issue when rejected)
//! - **Login**: access token → REST URL and `BhRestToken`
//! - **Renew**: refresh-or-issue, login, then one save to the credential store
//!
//! A request answered with 401 triggers one renewal and one resend; a second
//! 401 fails with `AuthFailure`.
//!
//! # Example
//!
//! ```rust,ignore
//! use integrations_bullhorn::{BullhornClient, BullhornConfig, FileCredentialStore, QueryOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileCredentialStore::new("auth.json");
//!     let client = BullhornClient::connect(BullhornConfig::from_env()?, store).await?;
//!
//!     let page: integrations_bullhorn::QueryPage = client
//!         .search()
//!         .search(
//!             "ClientCorporation",
//!             "status:Active",
//!             &QueryOptions::new().fields(["id", "name"]).sort("-dateAdded").count(5),
//!         )
//!         .await?;
//!
//!     for company in page.data {
//!         println!("{}", company["name"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, credential, query and event data structures
//! - `error`: error hierarchy
//! - `core`: HTTP transport and URL helpers
//! - `flows`: authorization code, refresh and session login exchanges
//! - `token`: credential storage and the token lifecycle manager
//! - `builders`: fluent configuration builder
//! - `client`: request dispatcher and high-level client
//! - `services`: entity, search and event operations

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod services;
pub mod token;
pub mod types;

// Re-export main client
pub use client::{BullhornClient, RequestDispatcher, RequestOptions, MAX_AUTH_RETRIES};

// Re-export builders
pub use builders::{bullhorn_config, BullhornConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, error_message, get_user_message, ArgumentError, AuthError,
    BullhornError, BullhornResult, ConfigurationError, NetworkError, ProtocolError, StorageError,
};

// Re-export types
pub use types::{
    // Config
    BullhornConfig, GrantType, ProviderConfig,
    // Credential
    Credential, RestSession, SessionState, TokenPair,
    // Query
    ChangeResponse, EntityResponse, QueryOptions, QueryPage,
    // Events
    EventBatch, EventPoll, SubscriptionEvent,
};

// Re-export core components
pub use core::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport, SESSION_HEADER,
};

// Re-export flows
pub use flows::{AuthorizationCodeFlow, RefreshFlow, SessionLoginFlow};

// Re-export token management
pub use token::{
    // Storage
    CredentialStore, FileCredentialStore, InMemoryCredentialStore, MockCredentialStore,
    // Manager
    DefaultTokenManager, MockTokenManager, TokenManager,
};

// Re-export services
pub use services::{
    identifier_list, is_immutable, EntityIds, EntityService, EventService, IntoEntityIds,
    SearchService, IMMUTABLE_ENTITIES, MAX_RECORDS, QUERY_BODY_THRESHOLD,
};
