//! Campaign listing, detail and time-series DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{DonorRankDto, FailedFetchDto, PaginationMeta, failed_dtos};
use crate::domain::timeseries::{ForecastPoint, TimeSeriesBucket, Trend};
use crate::domain::{Campaign, Donation, metrics};
use crate::service::analytics_service::{CampaignDetail, SeriesReport};

/// Query parameters for `GET /campaigns`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CampaignQuery {
    /// Sort key: `newest`, `oldest`, `endingSoon`, `mostFunded`,
    /// `leastFunded`, `percentFunded` or `alphabetical`.
    pub sort: Option<String>,
    /// Status filter: `all`, `active` or `ended`.
    pub status: Option<String>,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
    /// Owner address.
    pub owner: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    pub per_page: Option<u32>,
}

/// Query parameters for time-series endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeSeriesQuery {
    /// Bucket length in days (1 to 36500). Defaults to the configured value.
    pub interval_days: Option<u32>,
    /// Buckets to project past the history (max 365). Defaults to 7.
    pub forecast_days: Option<usize>,
}

/// Campaign as presented to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignDto {
    /// Contract index.
    pub id: u64,
    /// Creator address.
    pub owner: String,
    /// Display form of the owner address.
    pub owner_short: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Funding goal in ETH.
    pub target: f64,
    /// Amount raised in ETH.
    pub amount_collected: f64,
    /// Deadline (RFC 3339).
    pub deadline: DateTime<Utc>,
    /// Image URL.
    pub image: String,
    /// Whether the deadline is still ahead.
    pub is_active: bool,
    /// Whole days left, never negative.
    pub days_left: i64,
    /// Collected share of the target in percent, clamped to 0..=100.
    pub percent_funded: f64,
}

impl CampaignDto {
    /// Builds the DTO with status fields evaluated at `now`.
    #[must_use]
    pub fn from_campaign(campaign: &Campaign, now: DateTime<Utc>) -> Self {
        Self {
            id: campaign.id.get(),
            owner: campaign.owner.to_string(),
            owner_short: campaign.owner.short(),
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            target: campaign.target,
            amount_collected: campaign.amount_collected,
            deadline: campaign.deadline,
            image: campaign.image.clone(),
            is_active: campaign.is_active(now),
            days_left: campaign.days_left(now),
            percent_funded: metrics::success_rate(campaign.target, campaign.amount_collected),
        }
    }
}

/// Paginated campaign list.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignListResponse {
    /// Campaigns on this page.
    pub data: Vec<CampaignDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
    /// Sort key applied.
    pub sort: String,
    /// Ledger records skipped as malformed.
    pub rejected_records: usize,
}

/// One donation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationDto {
    /// Donor address.
    pub donor: String,
    /// Amount in ETH.
    pub amount: f64,
    /// When the donation was made, if known.
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Donation> for DonationDto {
    fn from(donation: &Donation) -> Self {
        Self {
            donor: donation.donor.to_string(),
            amount: donation.amount,
            timestamp: donation.timestamp,
        }
    }
}

/// Campaign detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignDetailResponse {
    /// The campaign.
    pub campaign: CampaignDto,
    /// Donations in ledger order.
    pub donations: Vec<DonationDto>,
    /// Sum of the donations in ETH.
    pub total_donated: f64,
    /// Distinct donors.
    pub donor_count: usize,
    /// Largest supporters.
    pub top_donors: Vec<DonorRankDto>,
    /// `true` when the donation history could not be read.
    pub partial: bool,
}

impl From<&CampaignDetail> for CampaignDetailResponse {
    fn from(detail: &CampaignDetail) -> Self {
        let mut campaign = CampaignDto::from_campaign(&detail.campaign, Utc::now());
        campaign.is_active = detail.is_active;
        campaign.days_left = detail.days_left;
        campaign.percent_funded = detail.success_rate;
        Self {
            campaign,
            donations: detail.donations.iter().map(DonationDto::from).collect(),
            total_donated: detail.total_donated,
            donor_count: detail.donor_count,
            top_donors: DonorRankDto::from_ranks(&detail.top_donors),
            partial: detail.partial,
        }
    }
}

/// One historical bucket.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BucketDto {
    /// Position from 0.
    pub index: usize,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Amount donated in the bucket.
    pub amount: f64,
    /// Donations in the bucket.
    pub count: u64,
    /// Running total through this bucket.
    pub cumulative_amount: f64,
    /// Running count through this bucket.
    pub cumulative_count: u64,
}

impl From<&TimeSeriesBucket> for BucketDto {
    fn from(b: &TimeSeriesBucket) -> Self {
        Self {
            index: b.index,
            start: b.start,
            end: b.end,
            amount: b.daily_amount,
            count: b.daily_count,
            cumulative_amount: b.cumulative_amount,
            cumulative_count: b.cumulative_count,
        }
    }
}

/// Fitted trend line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendDto {
    /// Change per bucket.
    pub slope: f64,
    /// Value at bucket 0.
    pub intercept: f64,
    /// Historical mean per bucket.
    pub average: f64,
    /// `true` when the history was too short to fit a line.
    pub degenerate: bool,
}

impl From<&Trend> for TrendDto {
    fn from(t: &Trend) -> Self {
        Self {
            slope: t.slope,
            intercept: t.intercept,
            average: t.average,
            degenerate: t.degenerate,
        }
    }
}

/// One projected bucket.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastPointDto {
    /// Position continuing the history.
    pub index: usize,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Projected amount, never negative.
    pub amount: f64,
    /// Projected running total.
    pub cumulative_amount: f64,
    /// `true` when the historical average replaced the trend value.
    pub fallback: bool,
}

impl From<&ForecastPoint> for ForecastPointDto {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            index: p.index,
            start: p.start,
            end: p.end,
            amount: p.daily_amount,
            cumulative_amount: p.cumulative_amount,
            fallback: p.fallback,
        }
    }
}

/// Time series with forecast.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSeriesResponse {
    /// `false` when the ledger is not initialized.
    pub ready: bool,
    /// Bucket length in days.
    pub interval_days: u32,
    /// Historical buckets.
    pub buckets: Vec<BucketDto>,
    /// `true` when the bucket cap cut the history short.
    pub truncated: bool,
    /// Amount past the last bucket when truncated.
    pub overflow_amount: f64,
    /// Donations past the last bucket when truncated.
    pub overflow_count: u64,
    /// Amount of donations without a timestamp.
    pub untimed_amount: f64,
    /// Donations without a timestamp.
    pub untimed_count: u64,
    /// Fitted trend.
    pub trend: TrendDto,
    /// Projected buckets.
    pub forecast: Vec<ForecastPointDto>,
    /// Campaigns whose donations could not be read.
    pub failed_campaigns: Vec<FailedFetchDto>,
}

impl From<&SeriesReport> for TimeSeriesResponse {
    fn from(report: &SeriesReport) -> Self {
        let series = &report.series;
        Self {
            ready: report.ready,
            interval_days: series.interval_days,
            buckets: series.buckets.iter().map(BucketDto::from).collect(),
            truncated: series.truncated,
            overflow_amount: series.overflow_amount,
            overflow_count: series.overflow_count,
            untimed_amount: series.untimed_amount,
            untimed_count: series.untimed_count,
            trend: TrendDto::from(&report.forecast.trend),
            forecast: report
                .forecast
                .points
                .iter()
                .map(ForecastPointDto::from)
                .collect(),
            failed_campaigns: failed_dtos(&report.failed),
        }
    }
}
