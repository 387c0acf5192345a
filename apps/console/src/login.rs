//! Login page controller.
//!
//! One submission reads the attempt tracker once and writes it at most once.
//! Credentials are checked by the [`AuthApi`] collaborator only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use auth::{AttemptTracker, AuthApi, AuthError, Clock, SessionStore};
use entities::{
    validation::{normalize_email, validate_email},
    Alert,
};
use tracing::{info, warn};

use crate::ConsoleResult;

/// Pages of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Login form.
    Login,
    /// User table and form.
    Users,
}

/// A page switch scheduled after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Destination page.
    pub page: Page,
    /// Delay before switching, so the alert stays visible.
    pub after: Duration,
}

/// Where a login submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Email rejected; nothing was recorded.
    Invalid,
    /// Another submission is still in flight.
    Busy,
    /// Refused without checking credentials.
    LockedOut { minutes: u64 },
    /// Credentials rejected; `count` failures so far.
    AuthFailed { count: u32, max_tries: u32 },
    /// Credentials rejected and the email is now locked.
    Locked { until: i64 },
    /// Logged in.
    AuthSucceeded,
}

/// Result of a login submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Final state.
    pub state: LoginState,
    /// Alert to show.
    pub alert: Alert,
    /// Page switch to perform, if any.
    pub navigation: Option<Navigation>,
}

impl LoginOutcome {
    fn new(state: LoginState, alert: Alert) -> Self {
        Self {
            state,
            alert,
            navigation: None,
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Login form handler.
pub struct LoginController {
    tracker: AttemptTracker,
    session: SessionStore,
    api: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
    redirect_delay: Duration,
    submitting: AtomicBool,
}

impl LoginController {
    /// Creates a new login controller.
    pub fn new(
        tracker: AttemptTracker,
        session: SessionStore,
        api: Arc<dyn AuthApi>,
        clock: Arc<dyn Clock>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            tracker,
            session,
            api,
            clock,
            redirect_delay,
            submitting: AtomicBool::new(false),
        }
    }

    /// Handles a login form submission.
    pub async fn submit(&self, email: &str, password: &str) -> ConsoleResult<LoginOutcome> {
        let email = normalize_email(email);
        if !validate_email(&email) {
            return Ok(LoginOutcome::new(
                LoginState::Invalid,
                Alert::warn("Informe um e-mail válido."),
            ));
        }

        if self.submitting.swap(true, Ordering::SeqCst) {
            return Ok(LoginOutcome::new(
                LoginState::Busy,
                Alert::warn("Aguarde, o login anterior ainda está em andamento."),
            ));
        }
        let _guard = SubmitGuard(&self.submitting);

        let state = self.tracker.get(&email).await?;
        let now = self.clock.now_millis();

        if self.tracker.is_locked(&state, now) {
            let minutes = state.remaining_minutes(now);
            info!(email = %email, minutes, "Login refused while locked");
            return Ok(LoginOutcome::new(
                LoginState::LockedOut { minutes },
                Alert::err(format!(
                    "Usuário bloqueado temporariamente. Tente novamente em ~{minutes} min."
                )),
            ));
        }

        let error = match self.api.login(&email, password).await {
            Ok(response) => {
                self.tracker.reset(&email).await?;
                self.session.persist(&email, &response).await?;
                info!(email = %email, "Login succeeded");

                return Ok(LoginOutcome {
                    state: LoginState::AuthSucceeded,
                    alert: Alert::ok("Login realizado! Redirecionando…"),
                    navigation: Some(Navigation {
                        page: Page::Users,
                        after: self.redirect_delay,
                    }),
                });
            }
            Err(AuthError::Store(e)) => return Err(e.into()),
            Err(e) => e,
        };

        let policy = *self.tracker.policy();
        let mut state = self.tracker.record_failure(state);

        if self.tracker.reached_limit(&state) {
            // Time may have moved while the backend answered
            state = self.tracker.lock(state, self.clock.now_millis());
            self.tracker.save(&email, &state).await?;
            warn!(email = %email, count = state.count, "Email locked after failed logins");

            return Ok(LoginOutcome::new(
                LoginState::Locked {
                    until: state.locked_until,
                },
                Alert::err(format!(
                    "{} tentativas incorretas. Usuário bloqueado por {} minutos.",
                    policy.max_tries,
                    policy.lock_minutes()
                )),
            ));
        }

        self.tracker.save(&email, &state).await?;
        warn!(email = %email, count = state.count, error = %error, "Login failed");

        Ok(LoginOutcome::new(
            LoginState::AuthFailed {
                count: state.count,
                max_tries: policy.max_tries,
            },
            Alert::err(format!(
                "{error} Tentativas: {}/{}",
                state.count, policy.max_tries
            )),
        ))
    }

    /// Handles the "forgot password" button.
    pub async fn forgot_password(&self, email: &str) -> ConsoleResult<Alert> {
        let email = normalize_email(email);
        if !validate_email(&email) {
            return Ok(Alert::warn(
                "Para redefinir, informe um e-mail válido no campo e-mail.",
            ));
        }

        match self.api.forgot_password(&email).await {
            Ok(()) => {
                info!(email = %email, "Password reset requested");
                Ok(Alert::ok(
                    "Se este e-mail existir, enviaremos um link/código de redefinição.",
                ))
            }
            Err(AuthError::Store(e)) => Err(e.into()),
            Err(e) => Ok(Alert::err(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use auth::{ApiError, AuthResult, LockoutPolicy, LoginResponse, ManualClock};
    use entities::{LoginAttemptState, Severity};
    use local_store::{KeyValueStore, MemoryStore};

    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    /// Accepts one password and records every call.
    struct FakeAuth {
        password: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl FakeAuth {
        fn new(password: &'static str) -> Self {
            Self {
                password,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse> {
            self.calls.lock().unwrap().push(email.to_string());
            if password == self.password {
                Ok(LoginResponse::new("tok-1"))
            } else {
                Err(ApiError::Status {
                    status: 401,
                    message: "Credenciais inválidas.".to_string(),
                }
                .into())
            }
        }

        async fn forgot_password(&self, email: &str) -> AuthResult<()> {
            if email.ends_with("@down.com") {
                return Err(ApiError::Network("connection refused".to_string()).into());
            }
            Ok(())
        }
    }

    /// Rejects every password after a delay.
    struct SlowAuth {
        delay: Duration,
    }

    #[async_trait]
    impl AuthApi for SlowAuth {
        async fn login(&self, _email: &str, _password: &str) -> AuthResult<LoginResponse> {
            tokio::time::sleep(self.delay).await;
            Err(ApiError::Status {
                status: 401,
                message: "Credenciais inválidas.".to_string(),
            }
            .into())
        }

        async fn forgot_password(&self, _email: &str) -> AuthResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        api: Arc<FakeAuth>,
        controller: LoginController,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let api = Arc::new(FakeAuth::new("123456"));
        let controller = LoginController::new(
            AttemptTracker::new(store.clone(), LockoutPolicy::default()),
            SessionStore::new(store.clone()),
            api.clone(),
            clock.clone(),
            Duration::from_millis(700),
        );
        Fixture {
            store,
            clock,
            api,
            controller,
        }
    }

    async fn stored_state(store: &MemoryStore, email: &str) -> Option<LoginAttemptState> {
        local_store::get_json(store, &format!("tries:{email}"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_email_has_no_effect() {
        let f = fixture();

        let outcome = f.controller.submit("not-an-email", "123456").await.unwrap();

        assert_eq!(outcome.state, LoginState::Invalid);
        assert_eq!(outcome.alert.severity, Severity::Warn);
        assert_eq!(outcome.alert.message, "Informe um e-mail válido.");
        assert_eq!(f.api.calls(), 0);
        assert!(f.store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_persists_session_and_navigates() {
        let f = fixture();

        let outcome = f.controller.submit(" A@B.com ", "123456").await.unwrap();

        assert_eq!(outcome.state, LoginState::AuthSucceeded);
        assert_eq!(outcome.alert, Alert::ok("Login realizado! Redirecionando…"));
        assert_eq!(
            outcome.navigation,
            Some(Navigation {
                page: Page::Users,
                after: Duration::from_millis(700)
            })
        );
        assert_eq!(f.store.get("token").await.unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            f.store.get("userEmail").await.unwrap().as_deref(),
            Some("a@b.com")
        );
        assert_eq!(
            stored_state(&f.store, "a@b.com").await,
            Some(LoginAttemptState::default())
        );
    }

    #[tokio::test]
    async fn test_failure_reports_remaining_attempts() {
        let f = fixture();

        let outcome = f.controller.submit("a@b.com", "wrong").await.unwrap();

        assert_eq!(
            outcome.state,
            LoginState::AuthFailed {
                count: 1,
                max_tries: 3
            }
        );
        assert_eq!(
            outcome.alert,
            Alert::err("Credenciais inválidas. Tentativas: 1/3")
        );
        assert!(outcome.navigation.is_none());
        assert!(!f.store.contains("token").await.unwrap());
        assert_eq!(
            stored_state(&f.store, "a@b.com").await,
            Some(LoginAttemptState {
                count: 1,
                locked_until: 0
            })
        );
    }

    #[tokio::test]
    async fn test_third_failure_locks_and_fourth_is_refused() {
        let f = fixture();

        for expected in 1..=2 {
            let outcome = f.controller.submit("a@b.com", "wrong").await.unwrap();
            assert_eq!(
                outcome.state,
                LoginState::AuthFailed {
                    count: expected,
                    max_tries: 3
                }
            );
            f.clock.advance(Duration::from_secs(10));
        }

        let third = f.controller.submit("a@b.com", "wrong").await.unwrap();
        let lock_time = f.clock.now_millis();
        assert_eq!(
            third.state,
            LoginState::Locked {
                until: lock_time + 300_000
            }
        );
        assert_eq!(
            third.alert,
            Alert::err("3 tentativas incorretas. Usuário bloqueado por 5 minutos.")
        );

        // Correct password, still refused, no credential check
        let calls_before = f.api.calls();
        let fourth = f.controller.submit("A@B.COM", "123456").await.unwrap();
        assert_eq!(fourth.state, LoginState::LockedOut { minutes: 5 });
        assert_eq!(
            fourth.alert,
            Alert::err("Usuário bloqueado temporariamente. Tente novamente em ~5 min.")
        );
        assert_eq!(f.api.calls(), calls_before);
        assert!(!f.store.contains("token").await.unwrap());

        // Lockout leaves the count alone
        assert_eq!(stored_state(&f.store, "a@b.com").await.unwrap().count, 3);
    }

    #[tokio::test]
    async fn test_remaining_minutes_shrink() {
        let f = fixture();
        for _ in 0..3 {
            f.controller.submit("a@b.com", "wrong").await.unwrap();
        }

        f.clock.advance(Duration::from_secs(4 * 60 + 30));
        let outcome = f.controller.submit("a@b.com", "123456").await.unwrap();
        assert_eq!(outcome.state, LoginState::LockedOut { minutes: 1 });
    }

    #[tokio::test]
    async fn test_success_after_lock_expiry_resets_state() {
        let f = fixture();
        for _ in 0..3 {
            f.controller.submit("a@b.com", "wrong").await.unwrap();
        }

        f.clock.advance(Duration::from_secs(5 * 60));
        let outcome = f.controller.submit("a@b.com", "123456").await.unwrap();

        assert_eq!(outcome.state, LoginState::AuthSucceeded);
        assert_eq!(
            stored_state(&f.store, "a@b.com").await,
            Some(LoginAttemptState::default())
        );
    }

    #[tokio::test]
    async fn test_counter_survives_lock_expiry() {
        let f = fixture();
        for _ in 0..3 {
            f.controller.submit("a@b.com", "wrong").await.unwrap();
        }

        f.clock.advance(Duration::from_secs(6 * 60));
        let outcome = f.controller.submit("a@b.com", "wrong").await.unwrap();

        // Count went from 3 to 4, which is past the limit: locked again
        assert!(matches!(outcome.state, LoginState::Locked { .. }));
        assert_eq!(stored_state(&f.store, "a@b.com").await.unwrap().count, 4);
    }

    #[tokio::test]
    async fn test_emails_are_tracked_separately() {
        let f = fixture();
        for _ in 0..3 {
            f.controller.submit("a@b.com", "wrong").await.unwrap();
        }

        let other = f.controller.submit("c@d.com", "123456").await.unwrap();
        assert_eq!(other.state, LoginState::AuthSucceeded);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = Arc::new(MemoryStore::new().with_quota(8));
        let controller = LoginController::new(
            AttemptTracker::new(store.clone(), LockoutPolicy::default()),
            SessionStore::new(store.clone()),
            Arc::new(FakeAuth::new("123456")),
            Arc::new(ManualClock::new(NOW)),
            Duration::ZERO,
        );

        let result = controller.submit("a@b.com", "wrong").await;
        assert!(matches!(result, Err(crate::ConsoleError::Store(_))));

        // The in-flight flag is released after an error
        let again = controller.submit("a@b.com", "wrong").await;
        assert!(matches!(again, Err(crate::ConsoleError::Store(_))));
    }

    #[tokio::test]
    async fn test_overlapping_submit_is_busy() {
        let store = Arc::new(MemoryStore::new());
        let controller = Arc::new(LoginController::new(
            AttemptTracker::new(store.clone(), LockoutPolicy::default()),
            SessionStore::new(store.clone()),
            Arc::new(SlowAuth {
                delay: Duration::from_millis(100),
            }),
            Arc::new(ManualClock::new(NOW)),
            Duration::ZERO,
        ));

        let (first, second) = tokio::join!(
            controller.submit("a@b.com", "x"),
            controller.submit("a@b.com", "x"),
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(
            first.state,
            LoginState::AuthFailed {
                count: 1,
                max_tries: 3
            }
        );
        assert_eq!(second.state, LoginState::Busy);
        assert_eq!(second.alert.severity, Severity::Warn);
        assert_eq!(
            stored_state(&store, "a@b.com").await,
            Some(LoginAttemptState {
                count: 1,
                locked_until: 0
            })
        );

        // The flag is released once the first submission ends
        let third = controller.submit("a@b.com", "x").await.unwrap();
        assert_eq!(
            third.state,
            LoginState::AuthFailed {
                count: 2,
                max_tries: 3
            }
        );
    }

    #[tokio::test]
    async fn test_forgot_password() {
        let f = fixture();

        let invalid = f.controller.forgot_password("nope").await.unwrap();
        assert_eq!(invalid.severity, Severity::Warn);

        let sent = f.controller.forgot_password("A@B.com").await.unwrap();
        assert_eq!(
            sent,
            Alert::ok("Se este e-mail existir, enviaremos um link/código de redefinição.")
        );

        let failed = f.controller.forgot_password("x@down.com").await.unwrap();
        assert_eq!(failed, Alert::err("Network error: connection refused"));

        // Password resets never touch the attempt tracker
        assert!(f.store.keys().await.unwrap().is_empty());
    }
}
