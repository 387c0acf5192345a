//! Fixed key layout of the local store

/// Authentication token returned by the login endpoint
pub const TOKEN: &str = "token";

/// Snapshot of the authenticated user, as returned by the login endpoint
pub const USER: &str = "user";

/// Normalized email of the last successful login
pub const USER_EMAIL: &str = "userEmail";

/// JSON array holding the simulated user directory
pub const DEMO_USERS: &str = "demoUsers";

/// Prefix of the per-email attempt tracker entries
pub const TRIES_PREFIX: &str = "tries:";

/// Key of the attempt tracker entry for an already normalized email
pub fn tries(normalized_email: &str) -> String {
    format!("{TRIES_PREFIX}{normalized_email}")
}
