//! Login attempt tracking and authentication for crud-senai.
//!
//! This crate provides:
//! - The per-email attempt tracker and its lockout policy
//! - Session persistence (token and user snapshot) in the local store
//! - The HTTP client for the backend API and the authentication collaborator

mod api;
mod attempts;
mod client;
mod clock;
mod error;
mod session;

pub use api::*;
pub use attempts::*;
pub use client::*;
pub use clock::*;
pub use error::*;
pub use session::*;

/// Default number of failed attempts before an email is locked.
pub const MAX_TRIES: u32 = 3;

/// Default lock duration in minutes.
pub const DEFAULT_LOCK_MINUTES: u64 = 5;

/// Default base URL of the backend API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
