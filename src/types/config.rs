//! Configuration Types
//!
//! Endpoints and transport settings for a Bullhorn session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::builders::BullhornConfigBuilder;
use crate::error::BullhornError;

/// Production authorization endpoint.
pub const AUTHORIZE_URL: &str = "https://auth.bullhornstaffing.com/oauth/authorize";
/// Production token endpoint.
pub const TOKEN_URL: &str = "https://auth.bullhornstaffing.com/oauth/token";
/// Production session login endpoint.
pub const LOGIN_URL: &str = "https://rest.bullhornstaffing.com/rest-services/login";
/// API version marker sent with every login.
pub const DEFAULT_API_VERSION: &str = "*";

/// Identity provider and login endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authorization-code endpoint.
    pub authorization_endpoint: String,
    /// Token endpoint (authorization_code and refresh_token grants).
    pub token_endpoint: String,
    /// REST session login endpoint.
    pub login_endpoint: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authorization_endpoint: AUTHORIZE_URL.to_string(),
            token_endpoint: TOKEN_URL.to_string(),
            login_endpoint: LOGIN_URL.to_string(),
        }
    }
}

/// Bullhorn client configuration.
#[derive(Clone, Debug)]
pub struct BullhornConfig {
    /// Provider endpoints.
    pub provider: ProviderConfig,
    /// Version marker passed to the login endpoint.
    pub api_version: String,
    /// Default timeout for every network call.
    pub timeout: Duration,
    /// Response size limit enforced by the reqwest transport.
    pub max_response_size: usize,
}

impl Default for BullhornConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: crate::core::DEFAULT_TIMEOUT,
            max_response_size: crate::core::DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

impl BullhornConfig {
    /// Create a new configuration builder.
    pub fn builder() -> BullhornConfigBuilder {
        BullhornConfigBuilder::new()
    }

    /// Build configuration from environment variables.
    ///
    /// Every variable is optional; unset ones keep the production defaults.
    pub fn from_env() -> Result<Self, BullhornError> {
        let mut builder = BullhornConfigBuilder::new();

        if let Ok(url) = std::env::var("BULLHORN_AUTH_URL") {
            builder = builder.authorization_endpoint(url);
        }

        if let Ok(url) = std::env::var("BULLHORN_TOKEN_URL") {
            builder = builder.token_endpoint(url);
        }

        if let Ok(url) = std::env::var("BULLHORN_LOGIN_URL") {
            builder = builder.login_endpoint(url);
        }

        if let Ok(version) = std::env::var("BULLHORN_API_VERSION") {
            builder = builder.api_version(version);
        }

        if let Ok(timeout_str) = std::env::var("BULLHORN_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }
}

/// OAuth grant type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    #[serde(rename = "refresh_token")]
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}
