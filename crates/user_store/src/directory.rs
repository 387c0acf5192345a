//! User directory over the local store.

use std::sync::Arc;

use entities::{
    generate_id,
    validation::{normalize_email, validate_email, validate_name},
    UserCandidate, UserRecord, ValidationError,
};
use local_store::{keys, KeyValueStore};
use tracing::{debug, info};

use crate::{DirectoryError, DirectoryResult};

/// Ordered user collection persisted under [`keys::DEMO_USERS`].
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    /// Creates a directory over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns every user in insertion order.
    pub async fn list(&self) -> DirectoryResult<Vec<UserRecord>> {
        let users: Option<Vec<UserRecord>> =
            local_store::get_json(self.store.as_ref(), keys::DEMO_USERS).await?;
        Ok(users.unwrap_or_default())
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: &str) -> DirectoryResult<Option<UserRecord>> {
        let users = self.list().await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    /// Creates or updates a user.
    ///
    /// An existing id is updated in place; otherwise the user is appended,
    /// with a fresh id when none was given. Rejected input leaves the
    /// directory untouched.
    pub async fn upsert(&self, candidate: UserCandidate) -> DirectoryResult<UserRecord> {
        let name = candidate.name.trim().to_string();
        let email = normalize_email(&candidate.email);

        validate_name(&name)?;
        if !validate_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        let id = candidate
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_id);

        let mut users = self.list().await?;
        if users
            .iter()
            .any(|u| normalize_email(&u.email) == email && u.id != id)
        {
            return Err(DirectoryError::DuplicateEmail(email));
        }

        let record = match users.iter().position(|u| u.id == id) {
            Some(idx) => {
                let existing = &mut users[idx];
                existing.name = name;
                existing.email = email;
                existing.profile = candidate.profile;
                existing.active = candidate.active;
                debug!(id = %existing.id, "Updating user");
                existing.clone()
            }
            None => {
                let record = UserRecord {
                    id,
                    name,
                    email,
                    profile: candidate.profile,
                    active: candidate.active,
                };
                debug!(id = %record.id, "Creating user");
                users.push(record.clone());
                record
            }
        };

        self.save(&users).await?;
        info!(id = %record.id, profile = %record.profile, "User saved");
        Ok(record)
    }

    /// Flips the active flag of `id`.
    ///
    /// Unknown ids are ignored and return `None`.
    pub async fn toggle_active(&self, id: &str) -> DirectoryResult<Option<UserRecord>> {
        let mut users = self.list().await?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            debug!(id = %id, "Toggle ignored for unknown user");
            return Ok(None);
        };

        user.active = !user.active;
        let toggled = user.clone();
        self.save(&users).await?;
        info!(id = %toggled.id, active = toggled.active, "User status toggled");
        Ok(Some(toggled))
    }

    /// Case-insensitive substring search over name and email.
    ///
    /// An empty term matches everyone.
    pub async fn search(&self, term: &str) -> DirectoryResult<Vec<UserRecord>> {
        let term = term.trim().to_lowercase();
        let users = self.list().await?;
        if term.is_empty() {
            return Ok(users);
        }

        Ok(users
            .into_iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&term) || u.email.to_lowercase().contains(&term)
            })
            .collect())
    }

    async fn save(&self, users: &[UserRecord]) -> DirectoryResult<()> {
        local_store::set_json(self.store.as_ref(), keys::DEMO_USERS, users).await?;
        Ok(())
    }
}
