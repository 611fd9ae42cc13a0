//! Injected ledger capabilities.
//!
//! The analytics engines never talk to the contract or its mirror directly.
//! They read through [`CampaignSource`] and [`DonationSource`], which the
//! binary wires to a concrete backend (in-memory seed or PostgreSQL). The
//! [`LedgerHandle`] holds that backend once it is available; until then it
//! reports "not ready" and callers render loading states.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CampaignId, Donation, RawCampaign};
use crate::error::FetchError;

/// Reads every campaign record the ledger knows about.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Returns all raw campaign records.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the backend cannot be read.
    async fn fetch_all_campaigns(&self) -> Result<Vec<RawCampaign>, FetchError>;
}

/// Reads the donations made to one campaign.
#[async_trait]
pub trait DonationSource: Send + Sync {
    /// Returns the normalized donations for `campaign_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the backend cannot be read.
    async fn fetch_donations(&self, campaign_id: CampaignId) -> Result<Vec<Donation>, FetchError>;
}

/// A complete ledger backend.
pub trait Ledger: CampaignSource + DonationSource + fmt::Debug {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Slot holding the ledger backend once it has been initialized.
#[derive(Debug, Clone, Default)]
pub struct LedgerHandle {
    inner: Arc<RwLock<Option<Arc<dyn Ledger>>>>,
}

impl LedgerHandle {
    /// Creates an empty (not ready) handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle with `ledger` already installed.
    #[must_use]
    pub fn ready(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ledger))),
        }
    }

    /// Installs or replaces the backend.
    pub async fn install(&self, ledger: Arc<dyn Ledger>) {
        tracing::info!(backend = ledger.backend_name(), "ledger installed");
        *self.inner.write().await = Some(ledger);
    }

    /// Returns the backend, or `None` when it is not initialized yet.
    pub async fn get(&self) -> Option<Arc<dyn Ledger>> {
        self.inner.read().await.clone()
    }

    /// Whether a backend is installed.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
