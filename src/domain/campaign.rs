//! Campaign records: the raw shape read from the ledger and the normalized
//! read model the analytics engines work on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, CampaignId};

/// Token amount as encoded by the ledger.
///
/// Externally tagged so the encoding is explicit on the wire:
/// `{"wei": "1500000000000000000"}` or `{"ether": 1.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAmount {
    /// Fixed-point integer in the token's smallest unit, as a decimal or
    /// `0x`-prefixed hex string.
    Wei(String),
    /// Already-normalized decimal amount.
    Ether(f64),
}

/// Unix timestamp in seconds as encoded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Plain integer seconds.
    Seconds(i64),
    /// Decimal or `0x`-prefixed hex string of seconds (big-number encoding).
    Text(String),
}

/// Campaign exactly as returned by the ledger, before validation.
///
/// Every field is optional: the normalizer decides which are required and
/// rejects the record when one is missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCampaign {
    /// Contract index.
    #[serde(default)]
    pub pid: Option<u64>,
    /// Owner address.
    #[serde(default)]
    pub owner: Option<String>,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Display description.
    #[serde(default)]
    pub description: Option<String>,
    /// Funding goal.
    #[serde(default)]
    pub target: Option<RawAmount>,
    /// Closing time.
    #[serde(default)]
    pub deadline: Option<RawTimestamp>,
    /// Amount raised so far.
    #[serde(default)]
    pub amount_collected: Option<RawAmount>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Normalized, immutable campaign read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Contract index.
    pub id: CampaignId,
    /// Owner address.
    pub owner: Address,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Funding goal in ETH.
    pub target: f64,
    /// Closing time. A campaign closes implicitly once this passes.
    pub deadline: DateTime<Utc>,
    /// Amount raised so far in ETH.
    pub amount_collected: f64,
    /// Image URL.
    pub image: String,
}

impl Campaign {
    /// Whether the deadline is still in the future at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.deadline > now
    }

    /// Whole days remaining until the deadline, never negative.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_days().max(0)
    }

    /// Collected amount as a fraction of the target (`0.8` = 80 %).
    ///
    /// Returns `0.0` when the target is not positive.
    #[must_use]
    pub fn funded_ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        self.amount_collected / self.target
    }

    /// Whether the campaign has reached its target.
    #[must_use]
    pub fn is_funded(&self) -> bool {
        self.target > 0.0 && self.amount_collected >= self.target
    }
}

impl From<&Campaign> for RawCampaign {
    fn from(campaign: &Campaign) -> Self {
        Self {
            pid: Some(campaign.id.get()),
            owner: Some(campaign.owner.as_str().to_string()),
            title: Some(campaign.title.clone()),
            description: Some(campaign.description.clone()),
            target: Some(RawAmount::Ether(campaign.target)),
            deadline: Some(RawTimestamp::Seconds(campaign.deadline.timestamp())),
            amount_collected: Some(RawAmount::Ether(campaign.amount_collected)),
            image: Some(campaign.image.clone()),
        }
    }
}
