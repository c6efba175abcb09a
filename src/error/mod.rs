//! Bullhorn Error Types
//!
//! Error hierarchy for the session layer. The dispatcher's renewal decision
//! depends on telling "no session", "HTTP 401" and "other HTTP error" apart,
//! so each of them has its own variant.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the Bullhorn integration.
#[derive(Error, Debug)]
pub enum BullhornError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid argument: {0}")]
    Argument(#[from] ArgumentError),

    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl BullhornError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "BULLHORN_CONFIG",
            Self::Auth(AuthError::NotAuthenticated) => "BULLHORN_NOT_AUTHENTICATED",
            Self::Auth(AuthError::AuthDenied { .. }) => "BULLHORN_AUTH_DENIED",
            Self::Auth(AuthError::RefreshRejected { .. }) => "BULLHORN_REFRESH_REJECTED",
            Self::Auth(AuthError::AuthFailure { .. }) => "BULLHORN_AUTH_FAILURE",
            Self::Argument(ArgumentError::InvalidArgument { .. }) => "BULLHORN_INVALID_ARGUMENT",
            Self::Argument(ArgumentError::ImmutableEntity { .. }) => "BULLHORN_IMMUTABLE_ENTITY",
            Self::Request { .. } => "BULLHORN_REQUEST",
            Self::Network(_) => "BULLHORN_NETWORK",
            Self::Protocol(_) => "BULLHORN_PROTOCOL",
            Self::Storage(_) => "BULLHORN_STORAGE",
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Auth(AuthError::AuthDenied { status, .. }) => *status,
            Self::Auth(AuthError::RefreshRejected { status, .. }) => Some(*status),
            Self::Auth(AuthError::AuthFailure { status }) => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller-level policy may reasonably retry the operation.
    ///
    /// Nothing in this crate acts on this; it only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            Self::Request { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether the error means the credential could not produce a session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::AuthFailure { .. }) | Self::Auth(AuthError::AuthDenied { .. })
        )
    }

    /// Whether the error is the recoverable "refresh token no longer valid" signal.
    pub fn is_refresh_rejected(&self) -> bool {
        matches!(self, Self::Auth(AuthError::RefreshRejected { .. }))
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },
}

/// Authentication and session error.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No active session: the credential has no session token")]
    NotAuthenticated,

    #[error("Identity provider denied the credentials: {message}")]
    AuthDenied {
        status: Option<u16>,
        message: String,
    },

    #[error("Refresh token rejected with status {status}")]
    RefreshRejected { status: u16, body: String },

    #[error("Authorization still failing with status {status} after session renewal")]
    AuthFailure { status: u16 },
}

/// Argument validation error, raised before any network call.
#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("The DELETE operation does not support entity type {entity}")]
    ImmutableEntity { entity: String },
}

impl ArgumentError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },
}

impl NetworkError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ConnectionFailed { .. })
    }
}

/// Protocol/response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

impl ProtocolError {
    pub(crate) fn json(error: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: error.to_string(),
        }
    }
}

/// Credential persistence error.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed for {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Write failed for {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Corrupted data: {message}")]
    CorruptedData { message: String },
}

/// Result type for Bullhorn operations.
pub type BullhornResult<T> = Result<T, BullhornError>;

/// Create an error from a non-success HTTP response on the REST API.
pub fn create_error_from_response(status: u16, body: &str) -> BullhornError {
    BullhornError::Request {
        status,
        body: body.to_string(),
    }
}

/// Extract the provider's message from an OAuth or REST error body.
///
/// Bullhorn answers with either `{"error": ..., "error_description": ...}`
/// (auth host) or `{"errorMessage": ...}` (REST host).
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "errorMessage", "error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
}

/// Get user-friendly error message.
pub fn get_user_message(error: &BullhornError) -> String {
    match error {
        BullhornError::Configuration(_) => {
            "The Bullhorn credentials are incomplete. Check the credential file.".to_string()
        }
        BullhornError::Auth(AuthError::AuthDenied { .. }) => {
            "Bullhorn rejected the username or password.".to_string()
        }
        BullhornError::Auth(AuthError::AuthFailure { .. }) => {
            "Your Bullhorn session could not be renewed. Please sign in again.".to_string()
        }
        BullhornError::Argument(e) => e.to_string(),
        BullhornError::Network(NetworkError::Timeout { .. }) => {
            "The request timed out. Please check your connection and try again.".to_string()
        }
        BullhornError::Request { status: 429, .. } => {
            "Too many requests. Please wait a moment and try again.".to_string()
        }
        _ => "A Bullhorn API error occurred. Please try again.".to_string(),
    }
}
