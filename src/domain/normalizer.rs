//! Campaign normalizer: converts ledger-native encodings into domain values.
//!
//! Fixed-point token amounts become decimal ETH, big-number timestamps
//! become [`DateTime<Utc>`], addresses are canonicalized. The normalizer
//! never divides by a record's own fields; zero targets pass through and
//! consumers guard their ratios.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::campaign::{RawAmount, RawTimestamp};
use super::{Address, Campaign, CampaignId, Donation, RawCampaign, RawDonation};
use crate::error::NormalizeError;

/// Decimals of the native token (wei per ether = 10^18).
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// A raw record that failed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position of the record in the input batch.
    pub index: usize,
    /// Contract index, when the record carried a readable one.
    pub pid: Option<u64>,
    /// Why the record was rejected.
    pub reason: String,
}

/// Result of normalizing a batch: the good records and the skipped ones.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Successfully normalized campaigns, in input order.
    pub campaigns: Vec<Campaign>,
    /// Records that were skipped.
    pub rejected: Vec<RejectedRecord>,
}

/// Stateless converter from raw ledger records to domain records.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    decimals: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_DECIMALS)
    }
}

impl Normalizer {
    /// Creates a normalizer for a token with `decimals` fractional digits.
    #[must_use]
    pub const fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Returns the configured token decimals.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Normalizes one campaign record.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MissingField`] when `pid`, `owner`,
    /// `target`, `deadline` or `amount_collected` is absent, and
    /// [`NormalizeError::Malformed`] when a value cannot be interpreted.
    /// Missing `title`, `description` and `image` default to empty strings.
    pub fn normalize_campaign(&self, raw: &RawCampaign) -> Result<Campaign, NormalizeError> {
        let id = raw.pid.ok_or(NormalizeError::MissingField("pid"))?;
        let owner = raw
            .owner
            .as_deref()
            .ok_or(NormalizeError::MissingField("owner"))?;
        let owner =
            Address::parse(owner).ok_or_else(|| NormalizeError::malformed("owner", "empty"))?;
        let target = self.amount(
            "target",
            raw.target
                .as_ref()
                .ok_or(NormalizeError::MissingField("target"))?,
        )?;
        let deadline = timestamp(
            "deadline",
            raw.deadline
                .as_ref()
                .ok_or(NormalizeError::MissingField("deadline"))?,
        )?;
        let amount_collected = self.amount(
            "amount_collected",
            raw.amount_collected
                .as_ref()
                .ok_or(NormalizeError::MissingField("amount_collected"))?,
        )?;

        Ok(Campaign {
            id: CampaignId::new(id),
            owner,
            title: raw.title.clone().unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            target,
            deadline,
            amount_collected,
            image: raw.image.clone().unwrap_or_default(),
        })
    }

    /// Normalizes a batch, skipping records that fail.
    ///
    /// Rejected records are logged at `warn` and returned alongside the
    /// good ones so callers can flag partial data.
    #[must_use]
    pub fn normalize_campaigns(&self, raws: &[RawCampaign]) -> NormalizedBatch {
        let mut batch = NormalizedBatch {
            campaigns: Vec::with_capacity(raws.len()),
            rejected: Vec::new(),
        };
        for (index, raw) in raws.iter().enumerate() {
            match self.normalize_campaign(raw) {
                Ok(campaign) => batch.campaigns.push(campaign),
                Err(err) => {
                    tracing::warn!(index, pid = ?raw.pid, error = %err, "skipping campaign record");
                    batch.rejected.push(RejectedRecord {
                        index,
                        pid: raw.pid,
                        reason: err.to_string(),
                    });
                }
            }
        }
        batch
    }

    /// Normalizes one donation made to `campaign_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MissingField`] when `donor` or `amount` is
    /// absent, and [`NormalizeError::Malformed`] when the amount is not
    /// positive or the timestamp cannot be read.
    pub fn normalize_donation(
        &self,
        campaign_id: CampaignId,
        raw: &RawDonation,
    ) -> Result<Donation, NormalizeError> {
        let donor = raw
            .donor
            .as_deref()
            .ok_or(NormalizeError::MissingField("donor"))?;
        let donor =
            Address::parse(donor).ok_or_else(|| NormalizeError::malformed("donor", "empty"))?;
        let amount = self.amount(
            "amount",
            raw.amount
                .as_ref()
                .ok_or(NormalizeError::MissingField("amount"))?,
        )?;
        if amount <= 0.0 {
            return Err(NormalizeError::malformed("amount", "must be positive"));
        }
        let timestamp = raw
            .timestamp
            .as_ref()
            .map(|ts| timestamp("timestamp", ts))
            .transpose()?;

        Ok(Donation {
            donor,
            campaign_id,
            amount,
            timestamp,
        })
    }

    /// Normalizes a campaign's donation list, skipping malformed entries.
    #[must_use]
    pub fn normalize_donations(&self, campaign_id: CampaignId, raws: &[RawDonation]) -> Vec<Donation> {
        raws.iter()
            .filter_map(|raw| match self.normalize_donation(campaign_id, raw) {
                Ok(donation) => Some(donation),
                Err(err) => {
                    tracing::warn!(%campaign_id, error = %err, "skipping donation record");
                    None
                }
            })
            .collect()
    }

    fn amount(&self, field: &'static str, raw: &RawAmount) -> Result<f64, NormalizeError> {
        match raw {
            RawAmount::Ether(value) => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(NormalizeError::malformed(
                        field,
                        format!("{value} is not a non-negative amount"),
                    ));
                }
                Ok(*value)
            }
            RawAmount::Wei(text) => {
                let wei = parse_big_integer(text)
                    .ok_or_else(|| NormalizeError::malformed(field, format!("`{text}` is not an integer")))?;
                wei_to_ether(wei, self.decimals).ok_or_else(|| {
                    NormalizeError::malformed(field, format!("unsupported decimals {}", self.decimals))
                })
            }
        }
    }
}

/// Converts a fixed-point integer amount into a decimal amount.
///
/// Whole and fractional parts are split in integer arithmetic so large
/// balances keep their integer part exact up to `f64` precision.
/// Returns `None` when `10^decimals` does not fit in a `u128`.
#[must_use]
pub fn wei_to_ether(wei: u128, decimals: u32) -> Option<f64> {
    let scale = 10u128.checked_pow(decimals)?;
    let whole = wei / scale;
    let fraction = wei % scale;
    #[allow(clippy::cast_precision_loss)]
    let value = whole as f64 + fraction as f64 / scale as f64;
    Some(value)
}

fn parse_big_integer(text: &str) -> Option<u128> {
    let text = text.trim();
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        return u128::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

fn timestamp(field: &'static str, raw: &RawTimestamp) -> Result<DateTime<Utc>, NormalizeError> {
    let seconds = match raw {
        RawTimestamp::Seconds(seconds) => *seconds,
        RawTimestamp::Text(text) => parse_big_integer(text)
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| NormalizeError::malformed(field, format!("`{text}` is not an integer")))?,
    };
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| NormalizeError::malformed(field, format!("{seconds} is out of range")))
}
