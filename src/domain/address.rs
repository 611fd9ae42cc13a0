//! Account addresses as they appear in campaign and donation records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque account identifier (campaign owner or donor).
///
/// Stored in canonical form: surrounding whitespace trimmed and ASCII
/// lowercased, so `0xABC` and `0xabc` key the same donor. Ordering is plain
/// string ordering, which the donor leaderboard uses to break ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Canonicalizes `raw` into an address.
    ///
    /// Returns `None` when nothing is left after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the canonical address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: `0x1234…abcd` for long addresses, unchanged otherwise.
    #[must_use]
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return self.0.clone();
        }
        let head: String = chars.iter().take(6).collect();
        let tail: String = chars.iter().skip(chars.len() - 4).collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
