//! crud-senai terminal front end library
//!
//! This module exposes the page controllers, the text rendering and the
//! interactive shell for use by the binary and by tests.

pub mod config;
pub mod error;
pub mod login;
pub mod render;
pub mod shell;
pub mod users;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, ConsoleResult};
pub use login::{LoginController, LoginOutcome, LoginState, Navigation, Page};
pub use shell::Shell;
pub use users::{Submission, UserForm, UsersController};

/// Initializes tracing on stderr so the text UI on stdout stays readable.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "crud_senai={log_level},auth={log_level},user_store={log_level},local_store={log_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
