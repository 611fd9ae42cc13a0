//! Stored record shapes: the JSON seed file and the mirror table rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CampaignId, RawAmount, RawCampaign, RawDonation, RawTimestamp};

/// Contents of a ledger seed file.
///
/// ```json
/// {
///   "campaigns": [{ "pid": 0, "owner": "0xabc", "target": {"ether": 5.0}, ... }],
///   "donations": [{ "campaign_id": 0, "donor": "0xdef", "amount": {"wei": "1000"} }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSeed {
    /// Raw campaign records.
    #[serde(default)]
    pub campaigns: Vec<RawCampaign>,
    /// Raw donation records tagged with their campaign.
    #[serde(default)]
    pub donations: Vec<SeedDonation>,
}

/// A donation record in a seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDonation {
    /// Campaign the donation belongs to.
    pub campaign_id: CampaignId,
    /// The donation itself.
    #[serde(flatten)]
    pub donation: RawDonation,
}

/// A row of the `campaigns` mirror table. Wei columns are read as text.
#[derive(Debug, Clone)]
pub struct CampaignRow {
    /// Contract index.
    pub id: i64,
    /// Owner address.
    pub owner: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Funding goal in wei.
    pub target_wei: Option<String>,
    /// Deadline in Unix seconds.
    pub deadline: Option<i64>,
    /// Amount collected in wei.
    pub amount_collected_wei: Option<String>,
    /// Image URL.
    pub image: Option<String>,
}

impl From<CampaignRow> for RawCampaign {
    fn from(row: CampaignRow) -> Self {
        Self {
            pid: u64::try_from(row.id).ok(),
            owner: row.owner,
            title: row.title,
            description: row.description,
            target: row.target_wei.map(RawAmount::Wei),
            deadline: row.deadline.map(RawTimestamp::Seconds),
            amount_collected: row.amount_collected_wei.map(RawAmount::Wei),
            image: row.image,
        }
    }
}

/// A row of the `donations` mirror table.
#[derive(Debug, Clone)]
pub struct DonationRow {
    /// Donor address.
    pub donor: Option<String>,
    /// Donated amount in wei.
    pub amount_wei: Option<String>,
    /// Block time of the donation, when indexed.
    pub donated_at: Option<DateTime<Utc>>,
}

impl From<DonationRow> for RawDonation {
    fn from(row: DonationRow) -> Self {
        Self {
            donor: row.donor,
            amount: row.amount_wei.map(RawAmount::Wei),
            timestamp: row.donated_at.map(|t| RawTimestamp::Seconds(t.timestamp())),
        }
    }
}
