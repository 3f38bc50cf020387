//! Error types for the API client.
//!
//! # Design
//! Callers receive exactly one error value per failed call. `AuthRedirect` is
//! a sentinel: by the time it is returned the credential has been dropped and
//! the navigator has been pointed at the login view, so UI code should not
//! render it. `Client` displays as the bare backend message so it can be shown
//! to the user as-is.

use thiserror::Error;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status that is not an auth expiry.
    #[error("{message}")]
    Client { status: u16, message: String },

    /// The session expired and a redirect to the login view was issued.
    #[error("authentication expired, redirecting to login")]
    AuthRedirect,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The decoded payload did not match the type the caller asked for.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

impl ApiError {
    pub fn is_auth_redirect(&self) -> bool {
        matches!(self, ApiError::AuthRedirect)
    }

    /// HTTP status attached to the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Network-level failures reported by a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

/// Failures of the persistent key-value slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}
