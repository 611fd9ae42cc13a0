//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::aggregator::FailedFetch;
use crate::domain::ranking::DonorRank;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Cuts the requested page out of `items`.
    ///
    /// A page past the end yields an empty slice with accurate metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(params.per_page)
        };
        let start = usize::try_from(u64::from(params.page - 1) * u64::from(params.per_page))
            .unwrap_or(usize::MAX);
        let per_page = usize::try_from(params.per_page).unwrap_or(usize::MAX);
        let data = items.into_iter().skip(start).take(per_page).collect();
        (
            data,
            PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        )
    }
}

/// One donor leaderboard row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonorRankDto {
    /// 1-based position.
    pub rank: usize,
    /// Donor address, lowercased.
    pub donor: String,
    /// Display form of the address.
    pub donor_short: String,
    /// Total donated in ETH.
    pub total: f64,
    /// Distinct campaigns supported.
    pub campaigns: u32,
}

impl DonorRankDto {
    /// Numbers ranked rows from 1.
    #[must_use]
    pub fn from_ranks(ranks: &[DonorRank]) -> Vec<Self> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, r)| Self {
                rank: i + 1,
                donor: r.donor.to_string(),
                donor_short: r.donor.short(),
                total: r.total,
                campaigns: r.campaigns,
            })
            .collect()
    }
}

/// A campaign whose donations could not be read.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailedFetchDto {
    /// Campaign index.
    pub campaign_id: u64,
    /// Failure description.
    pub reason: String,
}

impl From<&FailedFetch> for FailedFetchDto {
    fn from(failed: &FailedFetch) -> Self {
        Self {
            campaign_id: failed.campaign_id.get(),
            reason: failed.reason.clone(),
        }
    }
}

/// Converts a failure list.
#[must_use]
pub fn failed_dtos(failed: &[FailedFetch]) -> Vec<FailedFetchDto> {
    failed.iter().map(FailedFetchDto::from).collect()
}
