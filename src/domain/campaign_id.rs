//! Type-safe campaign identifier.
//!
//! [`CampaignId`] wraps the integer index the crowdfunding contract assigns
//! to a campaign at creation time, so campaign ids cannot be confused with
//! other integers (bucket indices, counts, limits).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Contract-assigned campaign index.
///
/// Stable, unique within a contract deployment and never reused. Higher ids
/// were created later, which the `newest`/`oldest` sort keys rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(u64);

impl CampaignId {
    /// Creates a `CampaignId` from the raw contract index.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw contract index.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CampaignId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<CampaignId> for u64 {
    fn from(id: CampaignId) -> Self {
        id.0
    }
}

impl FromStr for CampaignId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_contract_index() {
        assert!(CampaignId::new(1) < CampaignId::new(2));
        let mut ids = vec![CampaignId::new(3), CampaignId::new(1), CampaignId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![CampaignId::new(1), CampaignId::new(2), CampaignId::new(3)]);
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&CampaignId::new(42)).unwrap_or_default();
        assert_eq!(json, "42");
    }

    #[test]
    fn parses_from_path_segment() {
        let Ok(id) = " 17 ".parse::<CampaignId>() else {
            panic!("valid id");
        };
        assert_eq!(id.get(), 17);
        assert!("abc".parse::<CampaignId>().is_err());
    }

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(CampaignId::new(9).to_string(), "9");
    }
}
