//! User-related entity definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Profile {
    /// Administrator.
    Admin,
    /// Regular user.
    #[default]
    User,
}

impl Profile {
    /// Returns the wire representation (`ADMIN` / `USER`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(format!("Unknown profile: {other}")),
        }
    }
}

/// A user held by the simulated directory.
///
/// The password is never part of the record; it is accepted on input and
/// left to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: String,
    /// Assigned role.
    #[serde(default)]
    pub profile: Profile,
    /// Whether the user is active.
    pub active: bool,
}

impl UserRecord {
    /// Creates a new active user with a freshly generated id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            email: email.into(),
            profile: Profile::User,
            active: true,
        }
    }

    /// Sets the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Input accepted by the directory when creating or updating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCandidate {
    /// Existing id to update, or `None` to create.
    pub id: Option<String>,
    /// Raw display name.
    pub name: String,
    /// Raw email address.
    pub email: String,
    /// Requested role.
    pub profile: Profile,
    /// Requested status.
    pub active: bool,
    /// Password typed into the form. Never persisted.
    pub password: Option<String>,
}

impl UserCandidate {
    /// Creates a candidate for a new active user.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            profile: Profile::User,
            active: true,
            password: None,
        }
    }

    /// Targets an existing record.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Generates a fresh opaque user id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
