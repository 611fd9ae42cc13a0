//! Per-user campaign bookmarks kept in a [`KeyValueStore`].

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{Address, CampaignId};
use crate::error::AnalyticsError;
use crate::persistence::KeyValueStore;

/// Reads and writes bookmark sets stored as JSON arrays under
/// `bookmarks:{user}`.
///
/// Mutations are serialized so concurrent adds and removes never overwrite
/// each other's read-modify-write.
#[derive(Debug, Clone)]
pub struct BookmarkService {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl BookmarkService {
    /// Creates a new `BookmarkService`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the user's bookmarks in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] on store failure or when
    /// the stored value is not a JSON id array.
    pub async fn list(&self, user: &Address) -> Result<Vec<CampaignId>, AnalyticsError> {
        Ok(self.load(user).await?.into_iter().collect())
    }

    /// Bookmarks `campaign_id`. Adding an existing bookmark is a no-op.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list`].
    pub async fn add(
        &self,
        user: &Address,
        campaign_id: CampaignId,
    ) -> Result<Vec<CampaignId>, AnalyticsError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.load(user).await?;
        if ids.insert(campaign_id) {
            self.save(user, &ids).await?;
            tracing::debug!(%user, %campaign_id, "bookmark added");
        }
        Ok(ids.into_iter().collect())
    }

    /// Removes a bookmark. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list`].
    pub async fn remove(
        &self,
        user: &Address,
        campaign_id: CampaignId,
    ) -> Result<bool, AnalyticsError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.load(user).await?;
        if !ids.remove(&campaign_id) {
            return Ok(false);
        }
        if ids.is_empty() {
            self.store.delete(&key(user)).await?;
        } else {
            self.save(user, &ids).await?;
        }
        tracing::debug!(%user, %campaign_id, "bookmark removed");
        Ok(true)
    }

    async fn load(&self, user: &Address) -> Result<BTreeSet<CampaignId>, AnalyticsError> {
        match self.store.get(&key(user)).await? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                AnalyticsError::PersistenceError(format!("corrupt bookmarks for {user}: {e}"))
            }),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn save(&self, user: &Address, ids: &BTreeSet<CampaignId>) -> Result<(), AnalyticsError> {
        let json =
            serde_json::to_string(ids).map_err(|e| AnalyticsError::Internal(e.to_string()))?;
        self.store.put(&key(user), json).await
    }
}

fn key(user: &Address) -> String {
    format!("bookmarks:{user}")
}
