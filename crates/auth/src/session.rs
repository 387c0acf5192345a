//! Session persistence in the local store.

use std::sync::Arc;

use entities::validation::normalize_email;
use local_store::{keys, KeyValueStore};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{AuthResult, LoginResponse};

/// Stores the token and user snapshot of the current session.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Creates a session store over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Records a successful login for `email`.
    pub async fn persist(&self, email: &str, response: &LoginResponse) -> AuthResult<()> {
        self.store.set(keys::TOKEN, &response.token).await?;
        if let Some(user) = &response.user {
            local_store::set_json(self.store.as_ref(), keys::USER, user).await?;
        }
        self.store
            .set(keys::USER_EMAIL, &normalize_email(email))
            .await?;
        debug!("Session persisted");
        Ok(())
    }

    /// Returns the session token, if any.
    pub async fn token(&self) -> AuthResult<Option<String>> {
        Ok(self.store.get(keys::TOKEN).await?)
    }

    /// Returns true when a token is stored.
    pub async fn is_authenticated(&self) -> AuthResult<bool> {
        Ok(self.store.contains(keys::TOKEN).await?)
    }

    /// Returns the stored user snapshot.
    ///
    /// A snapshot that is not valid JSON is returned as a plain string.
    pub async fn user(&self) -> AuthResult<Option<Value>> {
        let Some(raw) = self.store.get(keys::USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(error = %e, "Stored user snapshot is not JSON");
                Ok(Some(Value::String(raw)))
            }
        }
    }

    /// Returns the email of the last successful login.
    pub async fn user_email(&self) -> AuthResult<Option<String>> {
        Ok(self.store.get(keys::USER_EMAIL).await?)
    }

    /// Drops the token. The user snapshot is kept.
    pub async fn clear_token(&self) -> AuthResult<()> {
        self.store.remove(keys::TOKEN).await?;
        debug!("Session token removed");
        Ok(())
    }
}
