//! Core entity definitions for the crud-senai front end.
//!
//! This crate defines the data types shared by the attempt tracker, the
//! simulated user directory and the page controllers, together with the
//! input validation rules they all agree on.

mod alert;
mod attempt;
mod user;
pub mod validation;

pub use alert::*;
pub use attempt::*;
pub use user::*;
pub use validation::ValidationError;
