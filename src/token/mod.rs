//! Token Management
//!
//! Credential persistence and the token lifecycle built on top of it.
//!
//! - **Credential Storage**: file, in-memory and mock stores
//! - **Token Manager**: issue, refresh, login and the composite renew

pub mod manager;
pub mod storage;

// Credential Storage
pub use storage::{
    CredentialStore, FileCredentialStore, InMemoryCredentialStore, MockCredentialStore,
};

// Token Manager
pub use manager::{DefaultTokenManager, MockTokenManager, TokenManager};
