//! Key-value store interface for presentation-layer state (bookmarks).
//!
//! The analytics engines never touch this store.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AnalyticsError;

/// Minimal string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on backend failure.
    async fn get(&self, key: &str) -> Result<Option<String>, AnalyticsError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on backend failure.
    async fn put(&self, key: &str, value: String) -> Result<(), AnalyticsError>;

    /// Removes `key`. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on backend failure.
    async fn delete(&self, key: &str) -> Result<bool, AnalyticsError>;
}

/// Process-local [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AnalyticsError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), AnalyticsError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AnalyticsError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
