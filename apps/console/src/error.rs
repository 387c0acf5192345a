//! Console error types.

use crate::config::ConfigError;

/// Console error type.
///
/// Storage failures surface as [`ConsoleError::Store`] whichever component
/// hit them.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Local store failed.
    #[error("Storage error: {0}")]
    Store(#[from] local_store::StoreError),

    /// Authentication failed outside the attempt flow.
    #[error(transparent)]
    Auth(auth::AuthError),

    /// User directory failed.
    #[error(transparent)]
    Directory(user_store::DirectoryError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<auth::AuthError> for ConsoleError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::Store(e) => ConsoleError::Store(e),
            other => ConsoleError::Auth(other),
        }
    }
}

impl From<user_store::DirectoryError> for ConsoleError {
    fn from(e: user_store::DirectoryError) -> Self {
        match e {
            user_store::DirectoryError::Store(e) => ConsoleError::Store(e),
            other => ConsoleError::Directory(other),
        }
    }
}

/// Result type alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
