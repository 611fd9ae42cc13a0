//! Donation aggregator: fans out per-campaign donation fetches and folds
//! the results into derived totals.
//!
//! Nothing is cached between calls. Every aggregate is re-derived from the
//! source records of the triggering read, so aggregating twice can never
//! double count. The fold is plain summation over completed results, which
//! makes it independent of the order in which concurrent fetches finish.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;

use super::ledger::DonationSource;
use super::{Address, Campaign, CampaignId, Donation};
use crate::error::FetchError;

/// Default bound on a single per-campaign fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// A per-campaign fetch that contributed zero because it did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFetch {
    /// Campaign whose donations could not be read.
    pub campaign_id: CampaignId,
    /// What went wrong.
    pub reason: String,
}

/// Raw outcome of the fan-out: donations per campaign plus failures.
#[derive(Debug, Clone, Default)]
pub struct DonationCollection {
    /// `false` when no donation source was available.
    pub ready: bool,
    /// Number of distinct campaigns that were asked for.
    pub campaign_count: usize,
    /// Donations of every campaign whose fetch completed, in input order.
    pub fetched: Vec<(CampaignId, Vec<Donation>)>,
    /// Campaigns whose fetch failed or timed out.
    pub failed: Vec<FailedFetch>,
}

impl DonationCollection {
    /// Iterates over every fetched donation.
    pub fn donations(&self) -> impl Iterator<Item = &Donation> {
        self.fetched.iter().flat_map(|(_, donations)| donations.iter())
    }

    /// Donations of one campaign; empty when it failed or was not asked for.
    #[must_use]
    pub fn for_campaign(&self, campaign_id: CampaignId) -> &[Donation] {
        self.fetched
            .iter()
            .find(|(id, _)| *id == campaign_id)
            .map(|(_, donations)| donations.as_slice())
            .unwrap_or(&[])
    }
}

/// Derived totals over a set of campaigns. Ephemeral; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedAggregate {
    /// Total donated per campaign. Failed campaigns appear with `0.0`.
    pub per_campaign_total: BTreeMap<CampaignId, f64>,
    /// Total donated per donor across all campaigns.
    pub per_donor_total: BTreeMap<Address, f64>,
    /// Number of distinct campaigns each donor gave to.
    pub per_donor_campaign_count: BTreeMap<Address, u32>,
    /// Sum of all per-campaign totals.
    pub global_total: f64,
    /// Number of distinct campaigns aggregated.
    pub campaign_count: usize,
    /// Number of donations folded.
    pub donation_count: usize,
}

impl DerivedAggregate {
    /// Number of distinct donors.
    #[must_use]
    pub fn donor_count(&self) -> usize {
        self.per_donor_total.len()
    }

    /// Mean donation size, `0.0` when there are no donations.
    #[must_use]
    pub fn average_donation(&self) -> f64 {
        if self.donation_count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.donation_count as f64;
        self.global_total / count
    }
}

/// Aggregation result with the failure report callers use to show a
/// "partial data" indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationReport {
    /// `false` when the donation source was not initialized.
    pub ready: bool,
    /// Derived totals.
    pub aggregate: DerivedAggregate,
    /// Campaigns that contributed zero because their fetch failed.
    pub failed: Vec<FailedFetch>,
}

impl AggregationReport {
    /// Whether any campaign's contribution is missing.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.ready || !self.failed.is_empty()
    }
}

/// Fan-out / fan-in donation aggregator.
#[derive(Debug, Clone, Copy)]
pub struct DonationAggregator {
    fetch_timeout: Duration,
}

impl Default for DonationAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl DonationAggregator {
    /// Creates an aggregator bounding each fetch by `fetch_timeout`.
    #[must_use]
    pub const fn new(fetch_timeout: Duration) -> Self {
        Self { fetch_timeout }
    }

    /// Upper bound on a single source call.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Fetches the donations of every campaign concurrently.
    ///
    /// A failed or timed-out fetch is recorded in
    /// [`DonationCollection::failed`] and the remaining campaigns are still
    /// collected. Duplicate campaign ids are fetched once. With no source
    /// the collection is empty and `ready` is `false`. Dropping the returned
    /// future abandons every in-flight fetch.
    pub async fn collect<S>(&self, campaigns: &[Campaign], source: Option<&S>) -> DonationCollection
    where
        S: DonationSource + ?Sized,
    {
        let Some(source) = source else {
            tracing::debug!("donation source not ready; returning empty collection");
            return DonationCollection::default();
        };

        let mut seen = BTreeSet::new();
        let ids: Vec<CampaignId> = campaigns
            .iter()
            .map(|c| c.id)
            .filter(|id| seen.insert(*id))
            .collect();

        let timeout = self.fetch_timeout;
        let fetches = ids.iter().map(|&campaign_id| async move {
            let result = match tokio::time::timeout(timeout, source.fetch_donations(campaign_id)).await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };
            (campaign_id, result)
        });

        let mut collection = DonationCollection {
            ready: true,
            campaign_count: ids.len(),
            fetched: Vec::with_capacity(ids.len()),
            failed: Vec::new(),
        };
        for (campaign_id, result) in join_all(fetches).await {
            match result {
                Ok(donations) => collection.fetched.push((campaign_id, donations)),
                Err(err) => {
                    tracing::warn!(%campaign_id, error = %err, "donation fetch failed; counting as zero");
                    collection.failed.push(FailedFetch {
                        campaign_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::debug!(
            campaigns = collection.campaign_count,
            failed = collection.failed.len(),
            "donation fan-out complete"
        );
        collection
    }

    /// Fetches and folds in one step.
    pub async fn aggregate<S>(&self, campaigns: &[Campaign], source: Option<&S>) -> AggregationReport
    where
        S: DonationSource + ?Sized,
    {
        let collection = self.collect(campaigns, source).await;
        AggregationReport {
            ready: collection.ready,
            aggregate: fold(&collection),
            failed: collection.failed,
        }
    }
}

/// Folds a collection into derived totals.
///
/// Purely additive: the result does not depend on the order of
/// `collection.fetched`. `global_total` is the sum of the per-campaign
/// totals, so the two always agree.
#[must_use]
pub fn fold(collection: &DonationCollection) -> DerivedAggregate {
    let mut aggregate = DerivedAggregate {
        campaign_count: collection.campaign_count,
        ..DerivedAggregate::default()
    };

    for failed in &collection.failed {
        aggregate.per_campaign_total.insert(failed.campaign_id, 0.0);
    }

    for (campaign_id, donations) in &collection.fetched {
        let mut campaign_total = 0.0;
        let mut donors_here = BTreeSet::new();
        for donation in donations {
            campaign_total += donation.amount;
            *aggregate
                .per_donor_total
                .entry(donation.donor.clone())
                .or_insert(0.0) += donation.amount;
            if donors_here.insert(&donation.donor) {
                *aggregate
                    .per_donor_campaign_count
                    .entry(donation.donor.clone())
                    .or_insert(0) += 1;
            }
        }
        *aggregate.per_campaign_total.entry(*campaign_id).or_insert(0.0) += campaign_total;
        aggregate.donation_count += donations.len();
    }

    aggregate.global_total = aggregate.per_campaign_total.values().sum();
    aggregate
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;

    fn addr(s: &str) -> Address {
        let Some(a) = Address::parse(s) else {
            panic!("valid address");
        };
        a
    }

    fn campaign(id: u64) -> Campaign {
        Campaign {
            id: CampaignId::new(id),
            owner: addr("0xowner"),
            title: format!("campaign {id}"),
            description: String::new(),
            target: 10.0,
            deadline: Utc::now(),
            amount_collected: 0.0,
            image: String::new(),
        }
    }

    fn donation(campaign: u64, donor: &str, amount: f64) -> Donation {
        Donation {
            donor: addr(donor),
            campaign_id: CampaignId::new(campaign),
            amount,
            timestamp: None,
        }
    }

    #[derive(Debug, Default)]
    struct StubSource {
        donations: HashMap<CampaignId, Vec<Donation>>,
        failing: Vec<CampaignId>,
        hanging: Vec<CampaignId>,
    }

    #[async_trait]
    impl DonationSource for StubSource {
        async fn fetch_donations(&self, campaign_id: CampaignId) -> Result<Vec<Donation>, FetchError> {
            if self.hanging.contains(&campaign_id) {
                std::future::pending::<()>().await;
            }
            if self.failing.contains(&campaign_id) {
                return Err(FetchError::Backend("rpc unavailable".to_string()));
            }
            Ok(self.donations.get(&campaign_id).cloned().unwrap_or_default())
        }
    }

    fn three_campaign_source() -> StubSource {
        let mut source = StubSource::default();
        source.donations.insert(
            CampaignId::new(1),
            vec![donation(1, "0xa", 1.0), donation(1, "0xb", 2.0), donation(1, "0xa", 0.5)],
        );
        source
            .donations
            .insert(CampaignId::new(2), vec![donation(2, "0xa", 4.0)]);
        source
            .donations
            .insert(CampaignId::new(3), vec![donation(3, "0xc", 3.0)]);
        source
    }

    #[tokio::test]
    async fn folds_per_campaign_and_per_donor_totals() {
        let source = three_campaign_source();
        let campaigns = vec![campaign(1), campaign(2), campaign(3)];

        let report = DonationAggregator::default()
            .aggregate(&campaigns, Some(&source))
            .await;
        let agg = &report.aggregate;

        assert!(report.ready);
        assert!(!report.is_partial());
        assert_eq!(agg.campaign_count, 3);
        assert_eq!(agg.donation_count, 5);
        assert_eq!(agg.per_campaign_total.get(&CampaignId::new(1)), Some(&3.5));
        assert_eq!(agg.per_donor_total.get(&addr("0xa")), Some(&5.5));
        assert_eq!(agg.per_donor_campaign_count.get(&addr("0xa")), Some(&2));
        assert_eq!(agg.per_donor_campaign_count.get(&addr("0xb")), Some(&1));
        assert!((agg.global_total - 10.5).abs() < 1e-9);
        assert_eq!(agg.donor_count(), 3);
        assert!((agg.average_donation() - 2.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn global_total_matches_sum_of_campaign_totals() {
        let source = three_campaign_source();
        let campaigns = vec![campaign(1), campaign(2), campaign(3), campaign(4)];
        let report = DonationAggregator::default()
            .aggregate(&campaigns, Some(&source))
            .await;
        let sum: f64 = report.aggregate.per_campaign_total.values().sum();
        assert!((sum - report.aggregate.global_total).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_fetch_counts_as_zero_and_is_reported() {
        let mut source = three_campaign_source();
        source.failing.push(CampaignId::new(2));
        let campaigns = vec![campaign(1), campaign(2), campaign(3)];

        let report = DonationAggregator::default()
            .aggregate(&campaigns, Some(&source))
            .await;

        assert!(report.ready);
        assert!(report.is_partial());
        assert_eq!(report.failed.len(), 1);
        let Some(failed) = report.failed.first() else {
            panic!("expected failure entry");
        };
        assert_eq!(failed.campaign_id, CampaignId::new(2));
        assert_eq!(
            report.aggregate.per_campaign_total.get(&CampaignId::new(2)),
            Some(&0.0)
        );
        assert!((report.aggregate.global_total - 6.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn hanging_fetch_times_out_without_blocking_others() {
        let mut source = three_campaign_source();
        source.hanging.push(CampaignId::new(3));
        let campaigns = vec![campaign(1), campaign(2), campaign(3)];

        let report = DonationAggregator::new(Duration::from_millis(20))
            .aggregate(&campaigns, Some(&source))
            .await;

        assert_eq!(report.failed.len(), 1);
        let Some(failed) = report.failed.first() else {
            panic!("expected timeout entry");
        };
        assert!(failed.reason.contains("timed out"));
        assert!((report.aggregate.global_total - 7.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_source_yields_zero_aggregate_not_ready() {
        let campaigns = vec![campaign(1), campaign(2)];
        let report = DonationAggregator::default()
            .aggregate::<StubSource>(&campaigns, None)
            .await;

        assert!(!report.ready);
        assert!(report.is_partial());
        assert_eq!(report.aggregate, DerivedAggregate::default());
    }

    #[tokio::test]
    async fn duplicate_campaigns_are_fetched_once() {
        let source = three_campaign_source();
        let campaigns = vec![campaign(1), campaign(1)];
        let report = DonationAggregator::default()
            .aggregate(&campaigns, Some(&source))
            .await;
        assert_eq!(report.aggregate.campaign_count, 1);
        assert!((report.aggregate.global_total - 3.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn repeated_aggregation_does_not_accumulate() {
        let source = three_campaign_source();
        let campaigns = vec![campaign(1), campaign(2), campaign(3)];
        let aggregator = DonationAggregator::default();
        let first = aggregator.aggregate(&campaigns, Some(&source)).await;
        let second = aggregator.aggregate(&campaigns, Some(&source)).await;
        assert_eq!(first, second);
    }

    #[test]
    fn fold_is_independent_of_arrival_order() {
        let forward = DonationCollection {
            ready: true,
            campaign_count: 2,
            fetched: vec![
                (CampaignId::new(1), vec![donation(1, "0xa", 1.0)]),
                (CampaignId::new(2), vec![donation(2, "0xa", 2.0)]),
            ],
            failed: Vec::new(),
        };
        let mut reversed = forward.clone();
        reversed.fetched.reverse();
        assert_eq!(fold(&forward), fold(&reversed));
    }

    #[test]
    fn collection_lookup_by_campaign() {
        let collection = DonationCollection {
            ready: true,
            campaign_count: 1,
            fetched: vec![(CampaignId::new(5), vec![donation(5, "0xa", 1.0)])],
            failed: Vec::new(),
        };
        assert_eq!(collection.for_campaign(CampaignId::new(5)).len(), 1);
        assert!(collection.for_campaign(CampaignId::new(6)).is_empty());
        assert_eq!(collection.donations().count(), 1);
    }
}
