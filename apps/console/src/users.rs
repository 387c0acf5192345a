//! Users page controller.

use entities::{Alert, Profile, UserCandidate, UserRecord};
use tracing::info;
use user_store::{DirectoryError, UserDirectory};

use auth::SessionStore;

use crate::{ConsoleError, ConsoleResult};

/// Password hint for a new user.
pub const NEW_PASSWORD_HINT: &str = "Senha (será criptografada no backend)";

/// Password hint while editing an existing user.
pub const KEEP_PASSWORD_HINT: &str = "Deixe em branco para manter a senha";

/// The create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    /// Id of the user being edited; empty for a new user.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub profile: Profile,
    /// Status.
    pub active: bool,
    /// Password field. Sent nowhere by the simulated directory.
    pub password: String,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            email: String::new(),
            profile: Profile::User,
            active: true,
            password: String::new(),
        }
    }
}

impl UserForm {
    /// Fills the form from an existing record. The password stays blank.
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile: user.profile,
            active: user.active,
            password: String::new(),
        }
    }

    /// Returns true when the form edits an existing user.
    pub fn is_editing(&self) -> bool {
        !self.id.is_empty()
    }

    /// Hint shown in the password field.
    pub fn password_hint(&self) -> &'static str {
        if self.is_editing() {
            KEEP_PASSWORD_HINT
        } else {
            NEW_PASSWORD_HINT
        }
    }

    /// Converts the form into directory input.
    pub fn to_candidate(&self) -> UserCandidate {
        UserCandidate {
            id: Some(self.id.clone()).filter(|id| !id.is_empty()),
            name: self.name.clone(),
            email: self.email.clone(),
            profile: self.profile,
            active: self.active,
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
        }
    }
}

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Alert to show.
    pub alert: Alert,
    /// Refreshed table, present only when the save went through.
    pub users: Option<Vec<UserRecord>>,
}

/// Users page handler.
pub struct UsersController {
    directory: UserDirectory,
    session: SessionStore,
}

impl UsersController {
    /// Creates a new users controller.
    pub fn new(directory: UserDirectory, session: SessionStore) -> Self {
        Self { directory, session }
    }

    /// Initial table content.
    pub async fn load(&self) -> ConsoleResult<Vec<UserRecord>> {
        Ok(self.directory.list().await?)
    }

    /// Saves the form. A successful save clears it.
    pub async fn submit(&self, form: &mut UserForm) -> ConsoleResult<Submission> {
        match self.directory.upsert(form.to_candidate()).await {
            Ok(_) => {
                *form = UserForm::default();
                Ok(Submission {
                    alert: Alert::ok("Usuário salvo com sucesso."),
                    users: Some(self.directory.list().await?),
                })
            }
            Err(DirectoryError::Validation(e)) => Ok(Submission {
                alert: Alert::warn(e.to_string()),
                users: None,
            }),
            Err(e @ DirectoryError::DuplicateEmail(_)) => Ok(Submission {
                alert: Alert::err(e.to_string()),
                users: None,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Form filled with the user `id`, if it exists.
    pub async fn edit(&self, id: &str) -> ConsoleResult<Option<UserForm>> {
        let user = self.directory.get(id).await?;
        Ok(user.as_ref().map(UserForm::from_record))
    }

    /// Cleared form.
    pub fn clear(&self) -> UserForm {
        UserForm::default()
    }

    /// Flips the status of `id` and returns the refreshed table.
    pub async fn toggle(&self, id: &str) -> ConsoleResult<Vec<UserRecord>> {
        self.directory.toggle_active(id).await?;
        Ok(self.directory.list().await?)
    }

    /// Filters the table by name or email.
    pub async fn search(&self, term: &str) -> ConsoleResult<Vec<UserRecord>> {
        Ok(self.directory.search(term).await?)
    }

    /// Drops the session token.
    pub async fn logout(&self) -> ConsoleResult<()> {
        self.session.clear_token().await.map_err(ConsoleError::from)?;
        info!("Logged out");
        Ok(())
    }
}
