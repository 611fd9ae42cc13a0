//! PostgreSQL ledger backend reading a mirror of the crowdfunding contract.
//!
//! An external indexer keeps the `campaigns` and `donations` tables in step
//! with the contract; this backend only reads them. Wei amounts live in
//! `NUMERIC(78, 0)` columns and are selected as text so no precision is
//! lost before normalization.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{CampaignRow, DonationRow};
use crate::config::AnalyticsConfig;
use crate::domain::{
    CampaignId, CampaignSource, Donation, DonationSource, Ledger, Normalizer, RawCampaign,
    RawDonation,
};
use crate::error::{AnalyticsError, FetchError};

/// Read-only ledger backed by `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
    normalizer: Normalizer,
}

impl PostgresLedger {
    /// Creates a ledger over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool, normalizer: Normalizer) -> Self {
        Self { pool, normalizer }
    }

    /// Opens a connection pool using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] when the database is
    /// unreachable.
    pub async fn connect(config: &AnalyticsConfig) -> Result<Self, AnalyticsError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| AnalyticsError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool, Normalizer::new(config.token_decimals)))
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PersistenceError`] when a migration fails.
    pub async fn migrate(&self) -> Result<(), AnalyticsError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AnalyticsError::PersistenceError(e.to_string()))
    }
}

type CampaignTuple = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

#[async_trait]
impl CampaignSource for PostgresLedger {
    async fn fetch_all_campaigns(&self) -> Result<Vec<RawCampaign>, FetchError> {
        let rows = sqlx::query_as::<_, CampaignTuple>(
            "SELECT id, owner, title, description, target_wei::TEXT, deadline, \
             amount_collected_wei::TEXT, image FROM campaigns ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FetchError::Backend(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, owner, title, description, target_wei, deadline, amount_collected_wei, image)| {
                    RawCampaign::from(CampaignRow {
                        id,
                        owner,
                        title,
                        description,
                        target_wei,
                        deadline,
                        amount_collected_wei,
                        image,
                    })
                },
            )
            .collect())
    }
}

#[async_trait]
impl DonationSource for PostgresLedger {
    async fn fetch_donations(&self, campaign_id: CampaignId) -> Result<Vec<Donation>, FetchError> {
        let id = i64::try_from(campaign_id.get())
            .map_err(|_| FetchError::Backend(format!("campaign id {campaign_id} out of range")))?;

        let rows = sqlx::query_as::<_, (Option<String>, Option<String>, Option<DateTime<Utc>>)>(
            "SELECT donor, amount_wei::TEXT, donated_at FROM donations \
             WHERE campaign_id = $1 ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FetchError::Backend(e.to_string()))?;

        let raws: Vec<RawDonation> = rows
            .into_iter()
            .map(|(donor, amount_wei, donated_at)| {
                RawDonation::from(DonationRow {
                    donor,
                    amount_wei,
                    donated_at,
                })
            })
            .collect();
        Ok(self.normalizer.normalize_donations(campaign_id, &raws))
    }
}

impl Ledger for PostgresLedger {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
