//! Donation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::campaign::{RawAmount, RawTimestamp};
use super::{Address, CampaignId};

/// Donation as returned by the ledger for one campaign.
///
/// The campaign id is implied by the fetch that produced the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDonation {
    /// Donor address.
    #[serde(default)]
    pub donor: Option<String>,
    /// Donated amount.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    /// When the donation was recorded, if the history carries it.
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
}

/// Normalized, immutable donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Donor address.
    pub donor: Address,
    /// Campaign the donation was made to.
    pub campaign_id: CampaignId,
    /// Donated amount in ETH, always positive.
    pub amount: f64,
    /// When the donation was recorded. Time-series features skip
    /// donations without one.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
