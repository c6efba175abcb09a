//! Configuration Builder
//!
//! Fluent builder for Bullhorn configuration.

use std::time::Duration;
use url::Url;

use crate::error::{BullhornError, ConfigurationError};
use crate::types::{BullhornConfig, ProviderConfig};

/// Bullhorn configuration builder.
pub struct BullhornConfigBuilder {
    provider: ProviderConfig,
    api_version: String,
    timeout: Duration,
    max_response_size: usize,
}

impl Default for BullhornConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BullhornConfigBuilder {
    /// Create new configuration builder with production defaults.
    pub fn new() -> Self {
        let defaults = BullhornConfig::default();
        Self {
            provider: defaults.provider,
            api_version: defaults.api_version,
            timeout: defaults.timeout,
            max_response_size: defaults.max_response_size,
        }
    }

    /// Set authorization endpoint.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider.authorization_endpoint = endpoint.into();
        self
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider.token_endpoint = endpoint.into();
        self
    }

    /// Set session login endpoint.
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider.login_endpoint = endpoint.into();
        self
    }

    /// Point every endpoint at one host, keeping the production paths.
    ///
    /// Used for data-center specific hosts and for tests against a local server.
    pub fn base_url(self, base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        self.authorization_endpoint(format!("{}/oauth/authorize", base))
            .token_endpoint(format!("{}/oauth/token", base))
            .login_endpoint(format!("{}/rest-services/login", base))
    }

    /// Set the login API version marker.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set response size limit.
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<BullhornConfig, BullhornError> {
        for endpoint in [
            &self.provider.authorization_endpoint,
            &self.provider.token_endpoint,
            &self.provider.login_endpoint,
        ] {
            Url::parse(endpoint).map_err(|_| ConfigurationError::InvalidEndpoint {
                url: endpoint.clone(),
            })?;
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired {
                field: "api_version".to_string(),
            }
            .into());
        }

        Ok(BullhornConfig {
            provider: self.provider,
            api_version: self.api_version,
            timeout: self.timeout,
            max_response_size: self.max_response_size,
        })
    }
}

/// Create a new Bullhorn configuration builder.
pub fn bullhorn_config() -> BullhornConfigBuilder {
    BullhornConfigBuilder::new()
}
