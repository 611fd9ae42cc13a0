//! Dashboard, leaderboard and profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::campaign_dto::CampaignDto;
use super::common_dto::{DonorRankDto, FailedFetchDto, failed_dtos};
use crate::service::analytics_service::{DashboardSummary, Leaderboard, Profile};

/// Query parameters for `GET /analytics/leaderboard`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Rows to return (1 to 100). Defaults to the configured length.
    pub limit: Option<usize>,
}

/// Platform dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// `false` when the ledger is not initialized; every figure is then zero.
    pub ready: bool,
    /// `true` when some campaign's donations could not be read.
    pub partial: bool,
    /// When the figures were computed.
    pub generated_at: DateTime<Utc>,
    /// Campaigns on the platform.
    pub campaign_count: usize,
    /// Campaigns still accepting donations.
    pub active_campaigns: usize,
    /// Campaigns that reached their target.
    pub successful_campaigns: usize,
    /// Sum of targets in ETH.
    pub total_target: f64,
    /// Sum of collected amounts reported by the contract.
    pub total_collected: f64,
    /// Sum of individual donations read from the ledger.
    pub total_raised: f64,
    /// `total_collected` over `total_target` in percent, clamped.
    pub overall_success_rate: f64,
    /// Distinct donors.
    pub unique_donors: usize,
    /// Donations read.
    pub donation_count: usize,
    /// Mean donation in ETH.
    pub average_donation: f64,
    /// Top donors.
    pub top_donors: Vec<DonorRankDto>,
    /// Campaigns counted as zero because their fetch failed.
    pub failed_campaigns: Vec<FailedFetchDto>,
    /// Ledger records skipped as malformed.
    pub rejected_records: usize,
}

impl From<&DashboardSummary> for DashboardResponse {
    fn from(s: &DashboardSummary) -> Self {
        let aggregate = &s.report.aggregate;
        Self {
            ready: s.report.ready,
            partial: s.report.is_partial(),
            generated_at: s.generated_at,
            campaign_count: s.campaign_count,
            active_campaigns: s.active_campaigns,
            successful_campaigns: s.successful_campaigns,
            total_target: s.total_target,
            total_collected: s.total_collected,
            total_raised: aggregate.global_total,
            overall_success_rate: s.overall_success_rate,
            unique_donors: aggregate.donor_count(),
            donation_count: aggregate.donation_count,
            average_donation: aggregate.average_donation(),
            top_donors: DonorRankDto::from_ranks(&s.top_donors),
            failed_campaigns: failed_dtos(&s.report.failed),
            rejected_records: s.rejected_records,
        }
    }
}

/// Donor leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// `false` when the ledger is not initialized.
    pub ready: bool,
    /// Ranked donors.
    pub donors: Vec<DonorRankDto>,
    /// Campaigns counted as zero because their fetch failed.
    pub failed_campaigns: Vec<FailedFetchDto>,
}

impl From<&Leaderboard> for LeaderboardResponse {
    fn from(board: &Leaderboard) -> Self {
        Self {
            ready: board.ready,
            donors: DonorRankDto::from_ranks(&board.donors),
            failed_campaigns: failed_dtos(&board.failed),
        }
    }
}

/// A campaign the profile has given to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContributionDto {
    /// Campaign index.
    pub campaign_id: u64,
    /// Campaign title.
    pub title: String,
    /// Total given in ETH.
    pub amount: f64,
    /// Number of donations.
    pub donations: usize,
}

/// User profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// Profile address.
    pub address: String,
    /// Display form of the address.
    pub address_short: String,
    /// Campaigns created by the address, newest first.
    pub owned_campaigns: Vec<CampaignDto>,
    /// Amount raised by owned campaigns.
    pub owned_collected: f64,
    /// Campaigns supported, largest contribution first.
    pub contributions: Vec<ContributionDto>,
    /// Total donated in ETH.
    pub total_donated: f64,
    /// Distinct campaigns supported.
    pub campaigns_supported: usize,
    /// Campaigns whose donations could not be read.
    pub failed_campaigns: Vec<FailedFetchDto>,
}

impl From<&Profile> for ProfileResponse {
    fn from(p: &Profile) -> Self {
        let now = Utc::now();
        Self {
            address: p.address.to_string(),
            address_short: p.address.short(),
            owned_campaigns: p
                .owned_campaigns
                .iter()
                .map(|c| CampaignDto::from_campaign(c, now))
                .collect(),
            owned_collected: p.owned_collected,
            contributions: p
                .contributions
                .iter()
                .map(|c| ContributionDto {
                    campaign_id: c.campaign_id.get(),
                    title: c.title.clone(),
                    amount: c.amount,
                    donations: c.donations,
                })
                .collect(),
            total_donated: p.total_donated,
            campaigns_supported: p.contributions.len(),
            failed_campaigns: failed_dtos(&p.failed),
        }
    }
}
