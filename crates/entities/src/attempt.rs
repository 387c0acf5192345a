//! Login attempt state.

use serde::{Deserialize, Serialize};

/// Milliseconds in one minute.
const MINUTE_MS: u64 = 60_000;

/// Failed-attempt counter and lockout deadline for one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttemptState {
    /// Consecutive failures since the last successful login.
    #[serde(default)]
    pub count: u32,
    /// Epoch milliseconds until which login is refused. `0` means unlocked.
    #[serde(default)]
    pub locked_until: i64,
}

impl LoginAttemptState {
    /// Returns true while `now` is before the lockout deadline.
    pub fn is_locked(&self, now: i64) -> bool {
        now < self.locked_until
    }

    /// Returns the state with one more failure recorded.
    pub fn record_failure(self) -> Self {
        Self {
            count: self.count.saturating_add(1),
            ..self
        }
    }

    /// Returns the state locked for `duration_ms` starting at `now`.
    pub fn lock(self, now: i64, duration_ms: i64) -> Self {
        Self {
            locked_until: now.saturating_add(duration_ms),
            ..self
        }
    }

    /// Whole minutes left on the lock, rounded up. `0` when unlocked.
    pub fn remaining_minutes(&self, now: i64) -> u64 {
        let remaining = self.locked_until.saturating_sub(now);
        if remaining <= 0 {
            return 0;
        }
        (remaining as u64).div_ceil(MINUTE_MS)
    }
}
