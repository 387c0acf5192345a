//! Authentication error types.

use thiserror::Error;

/// Errors returned by the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached or the transfer failed.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The server answered 2xx with an unusable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend API rejected or failed the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local store failed.
    #[error("Storage error: {0}")]
    Store(#[from] local_store::StoreError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
