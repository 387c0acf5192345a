//! Simulated user directory for crud-senai
//!
//! This crate keeps the user table in the local store as a single JSON array,
//! standing in for the backend CRUD endpoints until they exist. Every
//! operation reloads the whole collection and writes it back whole.

mod directory;
mod error;

pub use directory::*;
pub use error::*;
