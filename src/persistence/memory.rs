//! In-memory ledger backend, seeded from JSON or built in code.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;

use super::models::LedgerSeed;
use crate::domain::{
    CampaignId, CampaignSource, Donation, DonationSource, Ledger, Normalizer, RawCampaign,
    RawDonation,
};
use crate::error::{AnalyticsError, FetchError};

/// Ledger backed by records held in memory.
///
/// Campaigns can be marked as failing, in which case their donation fetch
/// returns a backend error. Used for local runs, demos and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    campaigns: Vec<RawCampaign>,
    donations: HashMap<CampaignId, Vec<RawDonation>>,
    failing: BTreeSet<CampaignId>,
    normalizer: Normalizer,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            ..Self::default()
        }
    }

    /// Builds a ledger from parsed seed contents.
    #[must_use]
    pub fn from_seed(seed: LedgerSeed, normalizer: Normalizer) -> Self {
        let mut ledger = Self::new(normalizer);
        ledger.campaigns = seed.campaigns;
        for entry in seed.donations {
            ledger
                .donations
                .entry(entry.campaign_id)
                .or_default()
                .push(entry.donation);
        }
        ledger
    }

    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] when the file cannot be
    /// read or is not a valid seed document.
    pub async fn load(path: &Path, normalizer: Normalizer) -> Result<Self, AnalyticsError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            AnalyticsError::PersistenceError(format!("reading {}: {e}", path.display()))
        })?;
        let seed: LedgerSeed = serde_json::from_str(&text).map_err(|e| {
            AnalyticsError::PersistenceError(format!("parsing {}: {e}", path.display()))
        })?;
        tracing::info!(
            path = %path.display(),
            campaigns = seed.campaigns.len(),
            donations = seed.donations.len(),
            "ledger seed loaded"
        );
        Ok(Self::from_seed(seed, normalizer))
    }

    /// Adds a campaign record.
    #[must_use]
    pub fn with_campaign(mut self, campaign: RawCampaign) -> Self {
        self.campaigns.push(campaign);
        self
    }

    /// Adds a donation record to `campaign_id`.
    #[must_use]
    pub fn with_donation(mut self, campaign_id: CampaignId, donation: RawDonation) -> Self {
        self.donations.entry(campaign_id).or_default().push(donation);
        self
    }

    /// Makes every donation fetch for `campaign_id` fail.
    #[must_use]
    pub fn with_failing_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.failing.insert(campaign_id);
        self
    }
}

#[async_trait]
impl CampaignSource for InMemoryLedger {
    async fn fetch_all_campaigns(&self) -> Result<Vec<RawCampaign>, FetchError> {
        Ok(self.campaigns.clone())
    }
}

#[async_trait]
impl DonationSource for InMemoryLedger {
    async fn fetch_donations(&self, campaign_id: CampaignId) -> Result<Vec<Donation>, FetchError> {
        if self.failing.contains(&campaign_id) {
            return Err(FetchError::Backend(format!(
                "donations for campaign {campaign_id} unavailable"
            )));
        }
        let raws = self
            .donations
            .get(&campaign_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(self.normalizer.normalize_donations(campaign_id, raws))
    }
}

impl Ledger for InMemoryLedger {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
