//! crud-senai terminal front end
//!
//! Login with attempt lockout and a simulated user table, persisted to a
//! local JSON file standing in for browser local storage.

use std::sync::Arc;

use auth::{ApiClient, AttemptTracker, HttpAuthApi, SessionStore, SystemClock};
use crud_senai::{init_tracing, ConsoleConfig, LoginController, Shell, UsersController};
use local_store::{FileStore, KeyValueStore};
use tokio::io::BufReader;
use tracing::info;
use user_store::UserDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ConsoleConfig::load()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_base_url = %config.api_base_url,
        data_file = %config.data_file.display(),
        "Starting crud-senai"
    );

    // Create the local store shared by every component
    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::new(config.data_file.clone()).with_quota(config.storage_quota_bytes),
    );

    let session = SessionStore::new(store.clone());
    let api = Arc::new(HttpAuthApi::new(ApiClient::new(
        &config.api_base_url,
        store.clone(),
    )));

    let login = LoginController::new(
        AttemptTracker::new(store.clone(), config.lockout_policy()),
        session.clone(),
        api,
        Arc::new(SystemClock),
        config.redirect_delay(),
    );
    let users = UsersController::new(UserDirectory::new(store.clone()), session.clone());

    let mut shell = Shell::new(login, users, session);
    let mut stdout = tokio::io::stdout();
    shell
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    Ok(())
}
