//! Console configuration

use std::path::PathBuf;
use std::time::Duration;

use auth::{LockoutPolicy, DEFAULT_API_BASE_URL, DEFAULT_LOCK_MINUTES, MAX_TRIES};
use serde::{Deserialize, Serialize};

/// Console configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// File holding the local store
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Maximum size of the local store in bytes
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: usize,

    /// Failed logins before an email is locked
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,

    /// Lock duration in minutes
    #[serde(default = "default_lock_minutes")]
    pub lock_minutes: u64,

    /// Delay between a successful login and showing the users page
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crud-senai")
        .join("local-storage.json")
}

fn default_storage_quota() -> usize {
    local_store::DEFAULT_QUOTA_BYTES
}

fn default_max_tries() -> u32 {
    MAX_TRIES
}

fn default_lock_minutes() -> u64 {
    DEFAULT_LOCK_MINUTES
}

fn default_redirect_delay_ms() -> u64 {
    700
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            data_file: default_data_file(),
            storage_quota_bytes: default_storage_quota(),
            max_tries: default_max_tries(),
            lock_minutes: default_lock_minutes(),
            redirect_delay_ms: default_redirect_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        // Start with defaults
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(url) = std::env::var("CRUD_SENAI_API_URL") {
            config.api_base_url = url;
        }

        if let Ok(path) = std::env::var("CRUD_SENAI_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        if let Ok(quota) = std::env::var("CRUD_SENAI_STORAGE_QUOTA") {
            config.storage_quota_bytes = quota.parse().unwrap_or_else(|_| default_storage_quota());
        }

        if let Ok(tries) = std::env::var("CRUD_SENAI_MAX_TRIES") {
            config.max_tries = tries.parse().unwrap_or(MAX_TRIES);
        }

        if let Ok(minutes) = std::env::var("CRUD_SENAI_LOCK_MINUTES") {
            config.lock_minutes = minutes.parse().unwrap_or(DEFAULT_LOCK_MINUTES);
        }

        if let Ok(delay) = std::env::var("CRUD_SENAI_REDIRECT_DELAY_MS") {
            config.redirect_delay_ms = delay.parse().unwrap_or(700);
        }

        if let Ok(level) = std::env::var("CRUD_SENAI_LOG_LEVEL") {
            config.log_level = level;
        }

        // Merge the config file; environment takes precedence
        if let Some(config_path) = Self::find_config_file() {
            let contents = std::fs::read_to_string(&config_path)?;
            let file_config = Self::from_toml(&contents)?;
            config.merge_file(file_config);
        }

        Ok(config)
    }

    /// Parses a TOML config file. Missing fields take their defaults
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Takes every field from `file` that is still at its default here
    pub fn merge_file(&mut self, file: ConsoleConfig) {
        let defaults = Self::default();

        if self.api_base_url == defaults.api_base_url {
            self.api_base_url = file.api_base_url;
        }
        if self.data_file == defaults.data_file {
            self.data_file = file.data_file;
        }
        if self.storage_quota_bytes == defaults.storage_quota_bytes {
            self.storage_quota_bytes = file.storage_quota_bytes;
        }
        if self.max_tries == defaults.max_tries {
            self.max_tries = file.max_tries;
        }
        if self.lock_minutes == defaults.lock_minutes {
            self.lock_minutes = file.lock_minutes;
        }
        if self.redirect_delay_ms == defaults.redirect_delay_ms {
            self.redirect_delay_ms = file.redirect_delay_ms;
        }
        if self.log_level == defaults.log_level {
            self.log_level = file.log_level;
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut locations = vec![PathBuf::from("crud-senai.toml")];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("crud-senai").join("config.toml"));
        }

        locations.into_iter().find(|p| p.exists())
    }

    /// Lockout policy built from the configured limits.
    ///
    /// Both limits are at least 1 so that a lock always applies.
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(
            self.max_tries.max(1),
            Duration::from_secs(self.lock_minutes.max(1).saturating_mul(60)),
        )
    }

    /// Delay before switching to the users page after a login
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
