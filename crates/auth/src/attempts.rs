//! Per-email login attempt tracking.
//!
//! Every email has a small record in the local store holding the number of
//! consecutive failures and the lockout deadline. The record is created lazily
//! on the first failure and only reset by a successful login; an expired lock
//! is never swept and simply stops applying once the deadline passes.

use std::sync::Arc;
use std::time::Duration;

use entities::{validation::normalize_email, LoginAttemptState};
use local_store::{keys, KeyValueStore, StoreError};
use tracing::{debug, warn};

use crate::{AuthResult, DEFAULT_LOCK_MINUTES, MAX_TRIES};

/// How many failures lock an email, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures that trigger the lock.
    pub max_tries: u32,
    /// Time the lock lasts, counted from the failure that triggered it.
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_tries: MAX_TRIES,
            lock_duration: Duration::from_secs(DEFAULT_LOCK_MINUTES * 60),
        }
    }
}

impl LockoutPolicy {
    /// Creates a policy.
    pub fn new(max_tries: u32, lock_duration: Duration) -> Self {
        Self {
            max_tries,
            lock_duration,
        }
    }

    /// Lock duration in milliseconds.
    pub fn lock_duration_ms(&self) -> i64 {
        i64::try_from(self.lock_duration.as_millis()).unwrap_or(i64::MAX)
    }

    /// Lock duration in whole minutes, rounded up.
    pub fn lock_minutes(&self) -> u64 {
        self.lock_duration.as_secs().div_ceil(60)
    }
}

/// Reads and writes attempt state in the local store.
#[derive(Clone)]
pub struct AttemptTracker {
    store: Arc<dyn KeyValueStore>,
    policy: LockoutPolicy,
}

impl AttemptTracker {
    /// Creates a tracker over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the lockout policy.
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Returns the stored state for `email`, or the zero-state.
    ///
    /// A stored value that cannot be decoded is treated as the zero-state.
    pub async fn get(&self, email: &str) -> AuthResult<LoginAttemptState> {
        let key = keys::tries(&normalize_email(email));
        match local_store::get_json::<LoginAttemptState>(self.store.as_ref(), &key).await {
            Ok(state) => Ok(state.unwrap_or_default()),
            Err(StoreError::Serialization(e)) => {
                warn!(key = %key, error = %e, "Discarding unreadable attempt state");
                Ok(LoginAttemptState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites the stored state for `email`.
    pub async fn save(&self, email: &str, state: &LoginAttemptState) -> AuthResult<()> {
        let key = keys::tries(&normalize_email(email));
        local_store::set_json(self.store.as_ref(), &key, state).await?;
        debug!(
            key = %key,
            count = state.count,
            locked_until = state.locked_until,
            "Saved attempt state"
        );
        Ok(())
    }

    /// Stores the zero-state for `email`.
    pub async fn reset(&self, email: &str) -> AuthResult<()> {
        self.save(email, &LoginAttemptState::default()).await
    }

    /// Returns true while the lock applies at `now`.
    pub fn is_locked(&self, state: &LoginAttemptState, now: i64) -> bool {
        state.is_locked(now)
    }

    /// Counts one more failure.
    pub fn record_failure(&self, state: LoginAttemptState) -> LoginAttemptState {
        state.record_failure()
    }

    /// Locks for the policy duration starting at `now`.
    pub fn lock(&self, state: LoginAttemptState, now: i64) -> LoginAttemptState {
        state.lock(now, self.policy.lock_duration_ms())
    }

    /// Returns true once `state` has reached the failure threshold.
    pub fn reached_limit(&self, state: &LoginAttemptState) -> bool {
        state.count >= self.policy.max_tries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_store::MemoryStore;

    fn tracker() -> (Arc<MemoryStore>, AttemptTracker) {
        let store = Arc::new(MemoryStore::new());
        let tracker = AttemptTracker::new(store.clone(), LockoutPolicy::default());
        (store, tracker)
    }

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_tries, 3);
        assert_eq!(policy.lock_duration_ms(), 300_000);
        assert_eq!(policy.lock_minutes(), 5);
    }

    #[tokio::test]
    async fn test_get_defaults_to_zero_state() {
        let (store, tracker) = tracker();

        let state = tracker.get("nobody@example.com").await.unwrap();
        assert_eq!(state, LoginAttemptState::default());

        // Reading never creates an entry
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_uses_normalized_key() {
        let (store, tracker) = tracker();
        let state = LoginAttemptState {
            count: 2,
            locked_until: 0,
        };

        tracker.save("  A@B.com ", &state).await.unwrap();

        assert_eq!(
            store.get("tries:a@b.com").await.unwrap().as_deref(),
            Some(r#"{"count":2,"lockedUntil":0}"#)
        );
        assert_eq!(tracker.get("a@b.COM").await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_corrupt_state_reads_as_zero() {
        let (store, tracker) = tracker();
        store.set("tries:a@b.com", "garbage").await.unwrap();

        assert_eq!(
            tracker.get("a@b.com").await.unwrap(),
            LoginAttemptState::default()
        );
    }

    #[tokio::test]
    async fn test_three_failures_lock_for_five_minutes() {
        let (_store, tracker) = tracker();
        let now = 1_700_000_000_000;

        let mut state = tracker.get("a@b.com").await.unwrap();
        for _ in 0..3 {
            assert!(!tracker.reached_limit(&state));
            state = tracker.record_failure(state);
        }
        assert!(tracker.reached_limit(&state));

        state = tracker.lock(state, now);
        tracker.save("a@b.com", &state).await.unwrap();

        let stored = tracker.get("a@b.com").await.unwrap();
        assert_eq!(stored.count, 3);
        assert!(tracker.is_locked(&stored, now + 299_999));
        assert!(!tracker.is_locked(&stored, now + 300_000));
        assert_eq!(stored.remaining_minutes(now), 5);
    }

    #[tokio::test]
    async fn test_reset() {
        let (_store, tracker) = tracker();
        let locked = LoginAttemptState {
            count: 3,
            locked_until: 42,
        };
        tracker.save("a@b.com", &locked).await.unwrap();

        tracker.reset("a@b.com").await.unwrap();

        assert_eq!(
            tracker.get("a@b.com").await.unwrap(),
            LoginAttemptState::default()
        );
    }

    #[tokio::test]
    async fn test_save_surfaces_quota_errors() {
        let store = Arc::new(MemoryStore::new().with_quota(4));
        let tracker = AttemptTracker::new(store, LockoutPolicy::default());

        let err = tracker
            .save("a@b.com", &LoginAttemptState::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::AuthError::Store(StoreError::QuotaExceeded { .. })
        ));
    }
}
