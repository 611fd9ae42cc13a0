//! Donor leaderboard.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Address, Donation};

/// Default leaderboard length.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 5;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorRank {
    /// Donor address.
    pub donor: Address,
    /// Total donated.
    pub total: f64,
    /// Number of distinct campaigns supported.
    pub campaigns: u32,
}

/// Ranks donors by total donated, descending.
///
/// Returns at most `limit` rows. Equal totals are ordered by ascending
/// donor address. Donors absent from `per_donor_campaign_count` report
/// zero campaigns.
#[must_use]
pub fn rank_donors(
    per_donor_total: &BTreeMap<Address, f64>,
    per_donor_campaign_count: &BTreeMap<Address, u32>,
    limit: usize,
) -> Vec<DonorRank> {
    let mut rows: Vec<DonorRank> = per_donor_total
        .iter()
        .map(|(donor, total)| DonorRank {
            donor: donor.clone(),
            total: *total,
            campaigns: per_donor_campaign_count.get(donor).copied().unwrap_or(0),
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.donor.cmp(&b.donor)));
    rows.truncate(limit);
    rows
}

/// Ranks the supporters of a single campaign from its donation list.
#[must_use]
pub fn rank_campaign_donors(donations: &[Donation], limit: usize) -> Vec<DonorRank> {
    let mut totals: BTreeMap<Address, f64> = BTreeMap::new();
    for donation in donations {
        *totals.entry(donation.donor.clone()).or_insert(0.0) += donation.amount;
    }
    let counts: BTreeMap<Address, u32> = totals.keys().map(|donor| (donor.clone(), 1)).collect();
    rank_donors(&totals, &counts, limit)
}
