//! User directory error types.

use entities::ValidationError;
use thiserror::Error;

/// Errors that can occur during user directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Input rejected before touching the directory.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another user already holds this email.
    #[error("Já existe usuário com este e-mail.")]
    DuplicateEmail(String),

    /// Local store error.
    #[error("Storage error: {0}")]
    Store(#[from] local_store::StoreError),
}

impl DirectoryError {
    /// Returns true for errors caused by user input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for user directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
