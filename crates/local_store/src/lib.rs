//! Local key-value storage for the crud-senai front end
//!
//! This crate provides the storage capability every other component is
//! built on: a flat map of string keys to string values, the same model as
//! browser local storage. Components receive the store explicitly and never
//! reach for a global one, so the local backends can be swapped for a remote
//! persistence service without touching controller logic.

mod error;
mod file;
pub mod keys;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub use error::*;
pub use file::*;
pub use memory::*;

/// Default quota, matching the usual browser local storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Trait for key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Gets the value stored under `key`
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Lists all keys, sorted
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Checks if a key exists
    async fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Reads and decodes a JSON value stored under `key`
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Bytes an entry counts against the quota
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Fails with [`StoreError::QuotaExceeded`] if writing `key = value` would push
/// the total size of `entries` above `quota`.
pub(crate) fn check_quota<'a>(
    entries: impl Iterator<Item = (&'a String, &'a String)>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> StoreResult<()> {
    let Some(limit) = quota else {
        return Ok(());
    };

    let others: usize = entries
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| entry_size(k, v))
        .sum();
    let required = others + entry_size(key, value);

    if required > limit {
        return Err(StoreError::QuotaExceeded { limit, required });
    }
    Ok(())
}
