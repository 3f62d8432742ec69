//! Gateway Error Types
//!
//! Error hierarchy for the exchange proxy, profile adapters and identity
//! broker, with the HTTP status each class is surfaced as.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;

/// Root error type for gateway requests.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Federation(#[from] FederationError),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Client(e) => e.status_code(),
            Self::Exchange(e) => e.status_code(),
            Self::Profile(e) => e.status_code(),
            Self::Federation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Caller mistakes. Nothing is sent upstream for these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Only POST method is allowed")]
    MethodNotAllowed,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Missing required parameter: {field}")]
    MissingParameter { field: &'static str },

    #[error("Unknown provider: {key}")]
    UnknownProvider { key: String },
}

impl ClientError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody | Self::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownProvider { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// Token endpoint exchange failure.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Failed to contact token endpoint: {source}")]
    TokenEndpointUnreachable { source: TransportError },

    #[error("Failed to read response")]
    ResponseUnreadable { source: TransportError },
}

impl ExchangeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenEndpointUnreachable { .. } => StatusCode::BAD_GATEWAY,
            Self::ResponseUnreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TransportError> for ExchangeError {
    fn from(source: TransportError) -> Self {
        match source {
            TransportError::ReadFailed { .. } | TransportError::ResponseTooLarge { .. } => {
                Self::ResponseUnreadable { source }
            }
            _ => Self::TokenEndpointUnreachable { source },
        }
    }
}

/// Profile endpoint failure.
///
/// Rejection and unreachability render identically: the adapter cannot tell
/// an invalid token from a provider outage.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to verify {provider} token")]
    Rejected { provider: &'static str, status: u16 },

    #[error("Failed to verify {provider} token")]
    Unreachable {
        provider: &'static str,
        source: TransportError,
    },

    #[error("Failed to parse {provider} user info")]
    Parse {
        provider: &'static str,
        message: String,
    },
}

impl ProfileError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected { .. } | Self::Unreachable { .. } => StatusCode::UNAUTHORIZED,
            Self::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Identity platform step failure while federating a profile.
#[derive(Error, Debug)]
pub enum FederationError {
    #[error("Error looking up user")]
    Lookup(#[source] StoreError),

    #[error("Failed to create new user")]
    Create(#[source] StoreError),

    #[error("Failed to create token")]
    Mint(#[source] StoreError),
}

/// Identity platform error.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("No user record for uid: {uid}")]
    UserNotFound { uid: String },

    #[error("User already exists: {uid}")]
    UserExists { uid: String },

    #[error("Identity platform rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity platform unreachable: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid identity platform response: {message}")]
    InvalidResponse { message: String },

    #[error("Token signing failed: {message}")]
    Signing { message: String },
}

impl StoreError {
    /// `true` for the lookup outcome that leads to user creation.
    pub fn is_user_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound { .. })
    }

    /// `true` when a create collided with an existing record.
    pub fn is_user_exists(&self) -> bool {
        matches!(self, Self::UserExists { .. })
    }
}

/// Network/transport error.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Failed to read response body: {message}")]
    ReadFailed { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("HTTP client setup failed: {message}")]
    Client { message: String },
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
