//! Inline alerts shown to the user.

use serde::{Deserialize, Serialize};

/// Severity of an inline alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Operation succeeded.
    Ok,
    /// Input rejected; nothing changed.
    Warn,
    /// Operation failed.
    Err,
}

impl Severity {
    /// Returns the class name (`ok` / `warn` / `err`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Err => "err",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient, dismissible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity class.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

impl Alert {
    /// Creates an alert.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Creates a success alert.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    /// Creates a warning alert.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, message)
    }

    /// Creates an error alert.
    pub fn err(message: impl Into<String>) -> Self {
        Self::new(Severity::Err, message)
    }
}
