//! Domain layer: campaign and donation records plus the pure analytics
//! engines that derive views from them.
//!
//! Data flows leaf-first: raw ledger reads pass through the
//! [`normalizer`], then into the [`aggregator`] and the [`sorting`]
//! engine, whose outputs feed [`ranking`], [`timeseries`] and [`metrics`].
//! None of these modules holds state between calls.

pub mod address;
pub mod aggregator;
pub mod campaign;
pub mod campaign_id;
pub mod donation;
pub mod ledger;
pub mod metrics;
pub mod normalizer;
pub mod ranking;
pub mod sorting;
pub mod timeseries;

pub use address::Address;
pub use aggregator::{AggregationReport, DerivedAggregate, DonationAggregator};
pub use campaign::{Campaign, RawAmount, RawCampaign, RawTimestamp};
pub use campaign_id::CampaignId;
pub use donation::{Donation, RawDonation};
pub use ledger::{CampaignSource, DonationSource, Ledger, LedgerHandle};
pub use normalizer::Normalizer;
pub use sorting::{CampaignFilter, SortKey, StatusFilter};
