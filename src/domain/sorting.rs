//! Sort/filter engine over normalized campaign collections.
//!
//! Every ordering is total: ties are broken by ascending campaign id, so
//! the same input and key always produce the same sequence. Inputs are
//! never mutated; each call returns a fresh `Vec`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, Campaign};

/// Closed set of campaign orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Highest id (most recently created) first.
    #[default]
    Newest,
    /// Lowest id first.
    Oldest,
    /// Earliest deadline first.
    EndingSoon,
    /// Largest amount collected first.
    MostFunded,
    /// Smallest amount collected first.
    LeastFunded,
    /// Highest collected/target ratio first.
    PercentFunded,
    /// Title A→Z, case-insensitive.
    Alphabetical,
}

impl SortKey {
    /// Every sort key, in presentation order.
    pub const ALL: [Self; 7] = [
        Self::Newest,
        Self::Oldest,
        Self::EndingSoon,
        Self::MostFunded,
        Self::LeastFunded,
        Self::PercentFunded,
        Self::Alphabetical,
    ];

    /// Wire name of the key (`"endingSoon"`, …).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::EndingSoon => "endingSoon",
            Self::MostFunded => "mostFunded",
            Self::LeastFunded => "leastFunded",
            Self::PercentFunded => "percentFunded",
            Self::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized sort key string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key `{0}`")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    /// Accepts the camelCase wire names as well as snake_case and
    /// kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == folded)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Deadline-based status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Keep every campaign.
    #[default]
    All,
    /// Keep campaigns whose deadline has not passed.
    Active,
    /// Keep campaigns whose deadline has passed.
    Ended,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "active" | "open" => Ok(Self::Active),
            "ended" | "closed" | "expired" => Ok(Self::Ended),
            other => Err(format!("unknown status filter `{other}`")),
        }
    }
}

/// Declarative campaign filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignFilter {
    /// Deadline status to keep.
    pub status: StatusFilter,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
    /// Keep only campaigns created by this owner.
    pub owner: Option<Address>,
}

impl CampaignFilter {
    fn matches(&self, campaign: &Campaign, now: DateTime<Utc>, needle: Option<&str>) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => campaign.is_active(now),
            StatusFilter::Ended => !campaign.is_active(now),
        };
        let owner_ok = self.owner.as_ref().is_none_or(|owner| &campaign.owner == owner);
        let search_ok = needle.is_none_or(|needle| {
            campaign.title.to_lowercase().contains(needle)
                || campaign.description.to_lowercase().contains(needle)
        });
        status_ok && owner_ok && search_ok
    }
}

/// Returns the campaigns matching `filter`, preserving input order.
#[must_use]
pub fn filter_campaigns(
    campaigns: &[Campaign],
    filter: &CampaignFilter,
    now: DateTime<Utc>,
) -> Vec<Campaign> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    campaigns
        .iter()
        .filter(|c| filter.matches(c, now, needle.as_deref()))
        .cloned()
        .collect()
}

/// Returns a new sequence of `campaigns` ordered by `key`.
#[must_use]
pub fn sort_campaigns(campaigns: &[Campaign], key: SortKey) -> Vec<Campaign> {
    // Titles are lowercased once per campaign, and only for alphabetical order.
    let mut keyed: Vec<(Option<String>, &Campaign)> = campaigns
        .iter()
        .map(|c| {
            let title = matches!(key, SortKey::Alphabetical).then(|| c.title.to_lowercase());
            (title, c)
        })
        .collect();
    keyed.sort_by(|(ta, a), (tb, b)| {
        compare(a, ta.as_deref(), b, tb.as_deref(), key).then_with(|| a.id.cmp(&b.id))
    });
    keyed.into_iter().map(|(_, c)| c.clone()).collect()
}

/// Filters then sorts.
#[must_use]
pub fn query_campaigns(
    campaigns: &[Campaign],
    filter: &CampaignFilter,
    key: SortKey,
    now: DateTime<Utc>,
) -> Vec<Campaign> {
    sort_campaigns(&filter_campaigns(campaigns, filter, now), key)
}

/// `title_a` and `title_b` are the lowercased titles, present for
/// [`SortKey::Alphabetical`].
fn compare(
    a: &Campaign,
    title_a: Option<&str>,
    b: &Campaign,
    title_b: Option<&str>,
    key: SortKey,
) -> Ordering {
    match key {
        SortKey::Newest => b.id.cmp(&a.id),
        SortKey::Oldest => a.id.cmp(&b.id),
        SortKey::EndingSoon => a.deadline.cmp(&b.deadline),
        SortKey::MostFunded => b.amount_collected.total_cmp(&a.amount_collected),
        SortKey::LeastFunded => a.amount_collected.total_cmp(&b.amount_collected),
        // Zero-target campaigns count as 0 % and go after other 0 % ones.
        SortKey::PercentFunded => b
            .funded_ratio()
            .total_cmp(&a.funded_ratio())
            .then_with(|| (a.target <= 0.0).cmp(&(b.target <= 0.0))),
        SortKey::Alphabetical => title_a.cmp(&title_b),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CampaignId;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        let Some(t) = Utc.timestamp_opt(1_700_000_000, 0).single() else {
            panic!("valid timestamp");
        };
        t
    }

    fn campaign(id: u64, target: f64, collected: f64) -> Campaign {
        let Some(owner) = Address::parse("0xowner") else {
            panic!("valid address");
        };
        Campaign {
            id: CampaignId::new(id),
            owner,
            title: format!("Campaign {id}"),
            description: String::new(),
            target,
            deadline: now() + Duration::days(i64::try_from(id).unwrap_or(0)),
            amount_collected: collected,
            image: String::new(),
        }
    }

    fn ids(campaigns: &[Campaign]) -> Vec<u64> {
        campaigns.iter().map(|c| c.id.get()).collect()
    }

    #[test]
    fn percent_funded_orders_by_ratio() {
        let campaigns = vec![campaign(2, 10.0, 5.0), campaign(1, 10.0, 8.0)];
        let sorted = sort_campaigns(&campaigns, SortKey::PercentFunded);
        assert_eq!(ids(&sorted), vec![1, 2]);
    }

    #[test]
    fn percent_funded_puts_zero_target_last_among_zero_ratio() {
        let campaigns = vec![
            campaign(1, 0.0, 5.0),
            campaign(2, 10.0, 0.0),
            campaign(3, 10.0, 1.0),
        ];
        let sorted = sort_campaigns(&campaigns, SortKey::PercentFunded);
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn newest_and_oldest_follow_id() {
        let campaigns = vec![campaign(2, 1.0, 0.0), campaign(3, 1.0, 0.0), campaign(1, 1.0, 0.0)];
        assert_eq!(ids(&sort_campaigns(&campaigns, SortKey::Newest)), vec![3, 2, 1]);
        assert_eq!(ids(&sort_campaigns(&campaigns, SortKey::Oldest)), vec![1, 2, 3]);
    }

    #[test]
    fn ending_soon_orders_by_deadline() {
        let mut late = campaign(1, 1.0, 0.0);
        late.deadline = now() + Duration::days(30);
        let soon = campaign(2, 1.0, 0.0);
        let sorted = sort_campaigns(&[late, soon], SortKey::EndingSoon);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn most_and_least_funded_are_reverses_without_ties() {
        let campaigns = vec![
            campaign(1, 10.0, 3.0),
            campaign(2, 10.0, 9.0),
            campaign(3, 10.0, 1.0),
            campaign(4, 10.0, 6.0),
        ];
        let most = ids(&sort_campaigns(&campaigns, SortKey::MostFunded));
        let mut least = ids(&sort_campaigns(&campaigns, SortKey::LeastFunded));
        least.reverse();
        assert_eq!(most, vec![2, 4, 1, 3]);
        assert_eq!(most, least);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let campaigns = vec![campaign(3, 10.0, 5.0), campaign(1, 10.0, 5.0), campaign(2, 10.0, 5.0)];
        for key in SortKey::ALL {
            if matches!(key, SortKey::Newest | SortKey::Oldest | SortKey::EndingSoon | SortKey::Alphabetical) {
                continue;
            }
            assert_eq!(ids(&sort_campaigns(&campaigns, key)), vec![1, 2, 3], "{key}");
        }
    }

    #[test]
    fn alphabetical_is_case_insensitive() {
        let mut a = campaign(1, 1.0, 0.0);
        a.title = "banana".to_string();
        let mut b = campaign(2, 1.0, 0.0);
        b.title = "Apple".to_string();
        let mut c = campaign(3, 1.0, 0.0);
        c.title = "apple".to_string();
        let sorted = sort_campaigns(&[a.clone(), b.clone(), c.clone()], SortKey::Alphabetical);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
        let reversed = sort_campaigns(&[c, b, a], SortKey::Alphabetical);
        assert_eq!(ids(&reversed), vec![2, 3, 1]);
    }

    #[test]
    fn sorting_is_deterministic_and_pure() {
        let campaigns = vec![campaign(2, 10.0, 5.0), campaign(1, 10.0, 8.0), campaign(3, 0.0, 1.0)];
        let snapshot = campaigns.clone();
        for key in SortKey::ALL {
            assert_eq!(sort_campaigns(&campaigns, key), sort_campaigns(&campaigns, key));
        }
        assert_eq!(campaigns, snapshot);
    }

    #[test]
    fn parses_wire_and_snake_case_names() {
        assert_eq!("endingSoon".parse::<SortKey>(), Ok(SortKey::EndingSoon));
        assert_eq!("percent_funded".parse::<SortKey>(), Ok(SortKey::PercentFunded));
        assert_eq!("most-funded".parse::<SortKey>(), Ok(SortKey::MostFunded));
        assert!("sideways".parse::<SortKey>().is_err());
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
        }
    }

    #[test]
    fn filter_by_status_search_and_owner() {
        let mut ended = campaign(1, 1.0, 0.0);
        ended.deadline = now() - Duration::days(1);
        ended.title = "Library books".to_string();
        let mut open = campaign(2, 1.0, 0.0);
        open.description = "New BOOKS for the library".to_string();
        let Some(other_owner) = Address::parse("0xother") else {
            panic!("valid address");
        };
        let mut foreign = campaign(3, 1.0, 0.0);
        foreign.owner = other_owner.clone();
        let campaigns = vec![ended, open, foreign];

        let active = CampaignFilter {
            status: StatusFilter::Active,
            ..CampaignFilter::default()
        };
        assert_eq!(ids(&filter_campaigns(&campaigns, &active, now())), vec![2, 3]);

        let books = CampaignFilter {
            search: Some("  Books ".to_string()),
            ..CampaignFilter::default()
        };
        assert_eq!(ids(&filter_campaigns(&campaigns, &books, now())), vec![1, 2]);

        let owned = CampaignFilter {
            owner: Some(other_owner),
            ..CampaignFilter::default()
        };
        assert_eq!(ids(&filter_campaigns(&campaigns, &owned, now())), vec![3]);

        let ended_only = CampaignFilter {
            status: StatusFilter::Ended,
            ..CampaignFilter::default()
        };
        let sorted = query_campaigns(&campaigns, &ended_only, SortKey::Newest, now());
        assert_eq!(ids(&sorted), vec![1]);
    }

    #[test]
    fn status_filter_parses_aliases() {
        assert_eq!("OPEN".parse::<StatusFilter>(), Ok(StatusFilter::Active));
        assert_eq!("closed".parse::<StatusFilter>(), Ok(StatusFilter::Ended));
        assert!("maybe".parse::<StatusFilter>().is_err());
    }
}
