//! Input normalization and validation rules.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Minimum display name length, in characters.
pub const MIN_NAME_LEN: usize = 3;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Email does not look like `local@domain.tld`.
    #[error("E-mail inválido.")]
    InvalidEmail,

    /// Name is shorter than the minimum.
    #[error("Nome deve ter pelo menos {min} caracteres.")]
    NameTooShort { min: usize },
}

/// Trims and lower-cases an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks the basic `local@domain.tld` shape.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Checks that the trimmed name has at least [`MIN_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort { min: MIN_NAME_LEN });
    }
    Ok(())
}
