//! Analytics service: composes the domain engines over the ledger handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AnalyticsConfig;
use crate::domain::aggregator::{FailedFetch, fold};
use crate::domain::normalizer::{NormalizedBatch, RejectedRecord};
use crate::domain::ranking::{DonorRank, rank_campaign_donors, rank_donors};
use crate::domain::sorting::query_campaigns;
use crate::domain::timeseries::{Forecast, TimeSeries, build_time_series, forecast};
use crate::domain::{
    Address, AggregationReport, Campaign, CampaignFilter, CampaignId, Donation,
    DonationAggregator, Ledger, LedgerHandle, Normalizer, SortKey, metrics,
};
use crate::error::{AnalyticsError, FetchError};

/// Defaults applied when a request leaves a knob unset.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsSettings {
    /// Leaderboard length.
    pub leaderboard_limit: usize,
    /// Time-series bucket length in days.
    pub default_interval_days: u32,
    /// Cap on generated buckets.
    pub max_buckets: usize,
}

impl From<&AnalyticsConfig> for AnalyticsSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            leaderboard_limit: config.leaderboard_limit,
            default_interval_days: config.default_interval_days,
            max_buckets: config.max_buckets,
        }
    }
}

/// Filtered, sorted campaign list.
#[derive(Debug, Clone)]
pub struct CampaignListing {
    /// Campaigns in presentation order.
    pub campaigns: Vec<Campaign>,
    /// Raw records skipped by the normalizer.
    pub rejected: Vec<RejectedRecord>,
}

/// Everything the campaign-detail view shows.
#[derive(Debug, Clone)]
pub struct CampaignDetail {
    /// The campaign.
    pub campaign: Campaign,
    /// Whether the deadline is still ahead.
    pub is_active: bool,
    /// Whole days left, never negative.
    pub days_left: i64,
    /// Collected share of the target in percent, clamped.
    pub success_rate: f64,
    /// Every donation, in ledger order.
    pub donations: Vec<Donation>,
    /// Sum of the donations.
    pub total_donated: f64,
    /// Distinct donors.
    pub donor_count: usize,
    /// Largest supporters.
    pub top_donors: Vec<DonorRank>,
    /// `true` when the donation fetch failed and the lists are empty.
    pub partial: bool,
}

/// Time series with its forecast.
#[derive(Debug, Clone)]
pub struct SeriesReport {
    /// `false` when the ledger is not initialized.
    pub ready: bool,
    /// Campaigns whose donations could not be read.
    pub failed: Vec<FailedFetch>,
    /// Historical buckets.
    pub series: TimeSeries,
    /// Projection past the last bucket.
    pub forecast: Forecast,
}

/// Platform-wide dashboard totals.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// When the summary was computed.
    pub generated_at: DateTime<Utc>,
    /// Campaigns that passed normalization.
    pub campaign_count: usize,
    /// Campaigns whose deadline is ahead.
    pub active_campaigns: usize,
    /// Campaigns that reached their target.
    pub successful_campaigns: usize,
    /// Sum of campaign targets.
    pub total_target: f64,
    /// Sum of `amount_collected` as reported by the contract.
    pub total_collected: f64,
    /// `total_collected` as a percentage of `total_target`, clamped.
    pub overall_success_rate: f64,
    /// Raw records skipped by the normalizer.
    pub rejected_records: usize,
    /// Donation aggregate and failure report.
    pub report: AggregationReport,
    /// Top donors across the platform.
    pub top_donors: Vec<DonorRank>,
}

/// Donor leaderboard.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    /// `false` when the ledger is not initialized.
    pub ready: bool,
    /// Campaigns whose donations could not be read.
    pub failed: Vec<FailedFetch>,
    /// Ranked donors.
    pub donors: Vec<DonorRank>,
}

/// One campaign a profile has given to.
#[derive(Debug, Clone)]
pub struct Contribution {
    /// Campaign id.
    pub campaign_id: CampaignId,
    /// Campaign title.
    pub title: String,
    /// Total given to the campaign.
    pub amount: f64,
    /// Number of donations to the campaign.
    pub donations: usize,
}

/// An address's activity on the platform.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Profile address.
    pub address: Address,
    /// Campaigns the address created, newest first.
    pub owned_campaigns: Vec<Campaign>,
    /// Amount raised across owned campaigns, per the contract.
    pub owned_collected: f64,
    /// Campaigns the address donated to, largest first.
    pub contributions: Vec<Contribution>,
    /// Total donated across all campaigns.
    pub total_donated: f64,
    /// Campaigns whose donations could not be read.
    pub failed: Vec<FailedFetch>,
}

/// Orchestration layer for all read paths.
///
/// Holds no derived state: every call reads through the ledger handle and
/// recomputes its view.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    ledger: LedgerHandle,
    normalizer: Normalizer,
    aggregator: DonationAggregator,
    settings: AnalyticsSettings,
}

impl AnalyticsService {
    /// Creates a new `AnalyticsService`.
    #[must_use]
    pub fn new(
        ledger: LedgerHandle,
        normalizer: Normalizer,
        aggregator: DonationAggregator,
        settings: AnalyticsSettings,
    ) -> Self {
        Self {
            ledger,
            normalizer,
            aggregator,
            settings,
        }
    }

    /// Builds the service from configuration.
    #[must_use]
    pub fn from_config(config: &AnalyticsConfig, ledger: LedgerHandle) -> Self {
        Self::new(
            ledger,
            Normalizer::new(config.token_decimals),
            DonationAggregator::new(config.fetch_timeout()),
            AnalyticsSettings::from(config),
        )
    }

    /// Returns the ledger handle.
    #[must_use]
    pub fn ledger_handle(&self) -> &LedgerHandle {
        &self.ledger
    }

    /// Returns the request defaults.
    #[must_use]
    pub const fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Lists campaigns matching `filter`, ordered by `sort`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceNotReady`] before the ledger is
    /// installed, or [`AnalyticsError::Fetch`] when campaigns cannot be read.
    pub async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
        sort: SortKey,
    ) -> Result<CampaignListing, AnalyticsError> {
        let ledger = self.require_ledger().await?;
        let batch = self.load_campaigns(ledger.as_ref()).await?;
        Ok(CampaignListing {
            campaigns: query_campaigns(&batch.campaigns, filter, sort, Utc::now()),
            rejected: batch.rejected,
        })
    }

    /// Returns the detail view of one campaign.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::CampaignNotFound`] for an unknown id, plus
    /// the errors of [`Self::list_campaigns`].
    pub async fn campaign_detail(&self, id: CampaignId) -> Result<CampaignDetail, AnalyticsError> {
        let ledger = self.require_ledger().await?;
        let campaign = self.find_campaign(ledger.as_ref(), id).await?;

        let collection = self
            .aggregator
            .collect(std::slice::from_ref(&campaign), Some(ledger.as_ref()))
            .await;
        let donations = collection.for_campaign(id).to_vec();
        let aggregate = fold(&collection);
        let now = Utc::now();

        Ok(CampaignDetail {
            is_active: campaign.is_active(now),
            days_left: campaign.days_left(now),
            success_rate: metrics::success_rate(campaign.target, campaign.amount_collected),
            total_donated: aggregate.global_total,
            donor_count: aggregate.donor_count(),
            top_donors: rank_campaign_donors(&donations, self.settings.leaderboard_limit),
            partial: !collection.failed.is_empty(),
            donations,
            campaign,
        })
    }

    /// Buckets one campaign's donations and projects them forward.
    ///
    /// `interval_days` defaults to the configured interval.
    ///
    /// # Errors
    ///
    /// Same as [`Self::campaign_detail`].
    pub async fn campaign_time_series(
        &self,
        id: CampaignId,
        interval_days: Option<u32>,
        forecast_days: usize,
    ) -> Result<SeriesReport, AnalyticsError> {
        let ledger = self.require_ledger().await?;
        let campaign = self.find_campaign(ledger.as_ref(), id).await?;
        let mut collection = self
            .aggregator
            .collect(std::slice::from_ref(&campaign), Some(ledger.as_ref()))
            .await;
        let failed = std::mem::take(&mut collection.failed);
        Ok(self.series_report(
            true,
            failed,
            collection.for_campaign(id),
            interval_days,
            forecast_days,
        ))
    }

    /// Buckets every donation on the platform and projects them forward.
    ///
    /// Before the ledger is installed this returns an empty, not-ready
    /// report rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Fetch`] when campaigns cannot be read.
    pub async fn platform_time_series(
        &self,
        interval_days: Option<u32>,
        forecast_days: usize,
    ) -> Result<SeriesReport, AnalyticsError> {
        let Some(ledger) = self.ledger.get().await else {
            return Ok(self.series_report(false, Vec::new(), &[], interval_days, forecast_days));
        };
        let batch = self.load_campaigns(ledger.as_ref()).await?;
        let collection = self
            .aggregator
            .collect(&batch.campaigns, Some(ledger.as_ref()))
            .await;
        let donations: Vec<Donation> = collection.donations().cloned().collect();
        Ok(self.series_report(true, collection.failed, &donations, interval_days, forecast_days))
    }

    /// Computes the platform dashboard.
    ///
    /// Before the ledger is installed this returns an all-zero summary whose
    /// report is marked not ready.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Fetch`] when campaigns cannot be read.
    pub async fn dashboard(&self) -> Result<DashboardSummary, AnalyticsError> {
        let now = Utc::now();
        let (batch, report) = match self.ledger.get().await {
            Some(ledger) => {
                let batch = self.load_campaigns(ledger.as_ref()).await?;
                let report = self
                    .aggregator
                    .aggregate(&batch.campaigns, Some(ledger.as_ref()))
                    .await;
                (batch, report)
            }
            None => (
                NormalizedBatch::default(),
                self.aggregator.aggregate::<dyn Ledger>(&[], None).await,
            ),
        };

        let campaigns = &batch.campaigns;
        let total_target: f64 = campaigns.iter().map(|c| c.target).sum();
        let total_collected: f64 = campaigns.iter().map(|c| c.amount_collected).sum();
        let top_donors = rank_donors(
            &report.aggregate.per_donor_total,
            &report.aggregate.per_donor_campaign_count,
            self.settings.leaderboard_limit,
        );

        Ok(DashboardSummary {
            generated_at: now,
            campaign_count: campaigns.len(),
            active_campaigns: campaigns.iter().filter(|c| c.is_active(now)).count(),
            successful_campaigns: campaigns.iter().filter(|c| c.is_funded()).count(),
            total_target,
            total_collected,
            overall_success_rate: metrics::success_rate(total_target, total_collected),
            rejected_records: batch.rejected.len(),
            report,
            top_donors,
        })
    }

    /// Ranks donors across the platform. `limit` defaults to the configured
    /// leaderboard length.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Fetch`] when campaigns cannot be read.
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Leaderboard, AnalyticsError> {
        let limit = limit.unwrap_or(self.settings.leaderboard_limit);
        let Some(ledger) = self.ledger.get().await else {
            return Ok(Leaderboard {
                ready: false,
                failed: Vec::new(),
                donors: Vec::new(),
            });
        };
        let batch = self.load_campaigns(ledger.as_ref()).await?;
        let report = self
            .aggregator
            .aggregate(&batch.campaigns, Some(ledger.as_ref()))
            .await;
        Ok(Leaderboard {
            ready: report.ready,
            donors: rank_donors(
                &report.aggregate.per_donor_total,
                &report.aggregate.per_donor_campaign_count,
                limit,
            ),
            failed: report.failed,
        })
    }

    /// Returns the campaigns owned by and donations made by `address`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceNotReady`] before the ledger is
    /// installed, or [`AnalyticsError::Fetch`] when campaigns cannot be read.
    pub async fn profile(&self, address: Address) -> Result<Profile, AnalyticsError> {
        let ledger = self.require_ledger().await?;
        let batch = self.load_campaigns(ledger.as_ref()).await?;
        let collection = self
            .aggregator
            .collect(&batch.campaigns, Some(ledger.as_ref()))
            .await;

        let owned_filter = CampaignFilter {
            owner: Some(address.clone()),
            ..CampaignFilter::default()
        };
        let owned_campaigns = query_campaigns(&batch.campaigns, &owned_filter, SortKey::Newest, Utc::now());
        let owned_collected = owned_campaigns.iter().map(|c| c.amount_collected).sum();

        let mut contributions: Vec<Contribution> = Vec::new();
        for (campaign_id, donations) in &collection.fetched {
            let mine: Vec<&Donation> = donations.iter().filter(|d| d.donor == address).collect();
            if mine.is_empty() {
                continue;
            }
            let title = batch
                .campaigns
                .iter()
                .find(|c| c.id == *campaign_id)
                .map(|c| c.title.clone())
                .unwrap_or_default();
            contributions.push(Contribution {
                campaign_id: *campaign_id,
                title,
                amount: mine.iter().map(|d| d.amount).sum(),
                donations: mine.len(),
            });
        }
        contributions.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });
        let total_donated = contributions.iter().map(|c| c.amount).sum();

        Ok(Profile {
            address,
            owned_campaigns,
            owned_collected,
            contributions,
            total_donated,
            failed: collection.failed,
        })
    }

    async fn require_ledger(&self) -> Result<Arc<dyn Ledger>, AnalyticsError> {
        self.ledger.get().await.ok_or(AnalyticsError::SourceNotReady)
    }

    async fn load_campaigns(&self, ledger: &dyn Ledger) -> Result<NormalizedBatch, AnalyticsError> {
        let timeout = self.aggregator.fetch_timeout();
        let raws = match tokio::time::timeout(timeout, ledger.fetch_all_campaigns()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                )
                .into());
            }
        };
        Ok(self.normalizer.normalize_campaigns(&raws))
    }

    async fn find_campaign(&self, ledger: &dyn Ledger, id: CampaignId) -> Result<Campaign, AnalyticsError> {
        self.load_campaigns(ledger)
            .await?
            .campaigns
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(AnalyticsError::CampaignNotFound(id.get()))
    }

    fn series_report(
        &self,
        ready: bool,
        failed: Vec<FailedFetch>,
        donations: &[Donation],
        interval_days: Option<u32>,
        forecast_days: usize,
    ) -> SeriesReport {
        let interval = interval_days.unwrap_or(self.settings.default_interval_days);
        let series = build_time_series(donations, interval, self.settings.max_buckets);
        let forecast = forecast(&series.buckets, forecast_days);
        SeriesReport {
            ready,
            failed,
            series,
            forecast,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{RawAmount, RawCampaign, RawDonation, RawTimestamp};
    use crate::persistence::InMemoryLedger;
    use chrono::Duration;

    fn raw_campaign(pid: u64, owner: &str, target: f64, collected: f64, days: i64) -> RawCampaign {
        RawCampaign {
            pid: Some(pid),
            owner: Some(owner.to_string()),
            title: Some(format!("Campaign {pid}")),
            description: Some(String::new()),
            target: Some(RawAmount::Ether(target)),
            deadline: Some(RawTimestamp::Seconds((Utc::now() + Duration::days(days)).timestamp())),
            amount_collected: Some(RawAmount::Ether(collected)),
            image: None,
        }
    }

    fn raw_donation(donor: &str, ether: f64, at: Option<i64>) -> RawDonation {
        RawDonation {
            donor: Some(donor.to_string()),
            amount: Some(RawAmount::Ether(ether)),
            timestamp: at.map(RawTimestamp::Seconds),
        }
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(Normalizer::default())
            .with_campaign(raw_campaign(0, "0xalice", 10.0, 5.0, 10))
            .with_campaign(raw_campaign(1, "0xbob", 10.0, 8.0, -1))
            .with_campaign(raw_campaign(2, "0xalice", 4.0, 4.0, 3))
            .with_campaign(RawCampaign::default())
            .with_donation(CampaignId::new(0), raw_donation("0xA", 3.0, Some(1_700_000_000)))
            .with_donation(CampaignId::new(0), raw_donation("0xB", 2.0, Some(1_700_086_400)))
            .with_donation(CampaignId::new(1), raw_donation("0xB", 3.0, None))
            .with_donation(CampaignId::new(1), raw_donation("0xA", 2.0, None))
            .with_donation(CampaignId::new(2), raw_donation("0xC", 4.0, None))
    }

    fn service(ledger: InMemoryLedger) -> AnalyticsService {
        AnalyticsService::from_config(
            &AnalyticsConfig::default(),
            LedgerHandle::ready(Arc::new(ledger)),
        )
    }

    fn not_ready_service() -> AnalyticsService {
        AnalyticsService::from_config(&AnalyticsConfig::default(), LedgerHandle::new())
    }

    #[tokio::test]
    async fn list_sorts_and_reports_rejected_records() {
        let Ok(listing) = service(ledger())
            .list_campaigns(&CampaignFilter::default(), SortKey::PercentFunded)
            .await
        else {
            panic!("listing failed");
        };
        let ids: Vec<u64> = listing.campaigns.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(listing.rejected.len(), 1);
    }

    #[tokio::test]
    async fn list_requires_ready_ledger() {
        let result = not_ready_service()
            .list_campaigns(&CampaignFilter::default(), SortKey::Newest)
            .await;
        assert!(matches!(result, Err(AnalyticsError::SourceNotReady)));
    }

    #[tokio::test]
    async fn detail_combines_campaign_and_donations() {
        let Ok(detail) = service(ledger()).campaign_detail(CampaignId::new(0)).await else {
            panic!("detail failed");
        };
        assert!(detail.is_active);
        assert!((detail.success_rate - 50.0).abs() < 1e-9);
        assert_eq!(detail.donations.len(), 2);
        assert!((detail.total_donated - 5.0).abs() < 1e-9);
        assert_eq!(detail.donor_count, 2);
        assert_eq!(detail.top_donors.first().map(|d| d.donor.as_str()), Some("0xa"));
        assert!(!detail.partial);
    }

    #[tokio::test]
    async fn detail_of_unknown_campaign_is_not_found() {
        let result = service(ledger()).campaign_detail(CampaignId::new(99)).await;
        assert!(matches!(result, Err(AnalyticsError::CampaignNotFound(99))));
    }

    #[tokio::test]
    async fn detail_marks_partial_when_donations_fail() {
        let svc = service(ledger().with_failing_campaign(CampaignId::new(0)));
        let Ok(detail) = svc.campaign_detail(CampaignId::new(0)).await else {
            panic!("detail failed");
        };
        assert!(detail.partial);
        assert!(detail.donations.is_empty());
    }

    #[tokio::test]
    async fn dashboard_totals_survive_one_failed_campaign() {
        let svc = service(ledger().with_failing_campaign(CampaignId::new(1)));
        let Ok(summary) = svc.dashboard().await else {
            panic!("dashboard failed");
        };
        assert_eq!(summary.campaign_count, 3);
        assert_eq!(summary.rejected_records, 1);
        assert_eq!(summary.active_campaigns, 2);
        assert_eq!(summary.successful_campaigns, 1);
        assert!((summary.total_target - 24.0).abs() < 1e-9);
        assert!((summary.total_collected - 17.0).abs() < 1e-9);
        assert!(summary.report.ready);
        assert_eq!(summary.report.failed.len(), 1);
        assert!((summary.report.aggregate.global_total - 9.0).abs() < 1e-9);
        assert_eq!(
            summary.report.aggregate.per_campaign_total.get(&CampaignId::new(1)),
            Some(&0.0)
        );
    }

    #[tokio::test]
    async fn dashboard_before_ledger_is_zero_and_not_ready() {
        let Ok(summary) = not_ready_service().dashboard().await else {
            panic!("dashboard must degrade, not fail");
        };
        assert!(!summary.report.ready);
        assert_eq!(summary.campaign_count, 0);
        assert!(summary.top_donors.is_empty());
        assert!(summary.overall_success_rate.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn leaderboard_ranks_across_campaigns() {
        let Ok(board) = service(ledger()).leaderboard(Some(2)).await else {
            panic!("leaderboard failed");
        };
        let donors: Vec<(&str, u32)> = board
            .donors
            .iter()
            .map(|d| (d.donor.as_str(), d.campaigns))
            .collect();
        assert_eq!(donors, vec![("0xa", 2), ("0xb", 2)]);
    }

    #[tokio::test]
    async fn profile_lists_owned_campaigns_and_contributions() {
        let Some(alice) = Address::parse("0xALICE") else {
            panic!("valid address");
        };
        let Ok(profile) = service(ledger()).profile(alice).await else {
            panic!("profile failed");
        };
        let owned: Vec<u64> = profile.owned_campaigns.iter().map(|c| c.id.get()).collect();
        assert_eq!(owned, vec![2, 0]);
        assert!((profile.owned_collected - 9.0).abs() < 1e-9);
        assert!(profile.contributions.is_empty());

        let Some(donor) = Address::parse("0xa") else {
            panic!("valid address");
        };
        let Ok(profile) = service(ledger()).profile(donor).await else {
            panic!("profile failed");
        };
        assert_eq!(profile.contributions.len(), 2);
        assert!((profile.total_donated - 5.0).abs() < 1e-9);
        assert_eq!(profile.contributions.first().map(|c| c.campaign_id.get()), Some(0));
    }

    #[tokio::test]
    async fn campaign_series_buckets_timed_donations() {
        let Ok(report) = service(ledger())
            .campaign_time_series(CampaignId::new(0), None, 3)
            .await
        else {
            panic!("series failed");
        };
        assert!(report.ready);
        assert_eq!(report.series.buckets.len(), 2);
        assert!((report.series.bucketed_amount() - 5.0).abs() < 1e-9);
        assert_eq!(report.forecast.points.len(), 3);
        assert!(report.forecast.points.iter().all(|p| p.daily_amount >= 0.0));
    }

    #[tokio::test]
    async fn campaign_series_of_failed_fetch_is_empty_and_reports_failure() {
        let svc = service(ledger().with_failing_campaign(CampaignId::new(0)));
        let Ok(report) = svc.campaign_time_series(CampaignId::new(0), Some(1), 2).await else {
            panic!("series failed");
        };
        assert!(report.ready);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed.first().map(|f| f.campaign_id), Some(CampaignId::new(0)));
        assert!(report.series.buckets.is_empty());
    }

    #[tokio::test]
    async fn platform_series_reports_untimed_donations() {
        let Ok(report) = service(ledger()).platform_time_series(Some(1), 0).await else {
            panic!("series failed");
        };
        assert_eq!(report.series.untimed_count, 3);
        assert!((report.series.untimed_amount - 9.0).abs() < 1e-9);

        let Ok(empty) = not_ready_service().platform_time_series(None, 5).await else {
            panic!("series must degrade");
        };
        assert!(!empty.ready);
        assert!(empty.series.buckets.is_empty());
        assert!(empty.forecast.points.is_empty());
    }
}
