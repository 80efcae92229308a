//! Cache Category Module
//!
//! Fixed classification of cached upstream data, each with its own staleness bound.

use std::fmt;

use serde::Serialize;

// == Cache Category ==
/// Kind of upstream data held in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheCategory {
    LeagueInfo,
    Rosters,
    LiveScores,
    Players,
    Standings,
    Transactions,
}

impl CacheCategory {
    /// Every category, in declaration order.
    pub const ALL: [CacheCategory; 6] = [
        CacheCategory::LeagueInfo,
        CacheCategory::Rosters,
        CacheCategory::LiveScores,
        CacheCategory::Players,
        CacheCategory::Standings,
        CacheCategory::Transactions,
    ];

    /// Stable name used in logs and rendered keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::LeagueInfo => "leagueInfo",
            CacheCategory::Rosters => "rosters",
            CacheCategory::LiveScores => "liveScores",
            CacheCategory::Players => "players",
            CacheCategory::Standings => "standings",
            CacheCategory::Transactions => "transactions",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == TTL Policy ==
/// Per-category time-to-live in seconds.
///
/// TTL belongs to the category, not to the entry: an entry captures its
/// expiration when written, so changing a TTL here only affects later writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub league_info: u64,
    pub rosters: u64,
    pub live_scores: u64,
    pub players: u64,
    pub standings: u64,
    pub transactions: u64,
}

impl TtlPolicy {
    /// Returns the TTL in seconds for a category.
    pub fn ttl_for(&self, category: CacheCategory) -> u64 {
        match category {
            CacheCategory::LeagueInfo => self.league_info,
            CacheCategory::Rosters => self.rosters,
            CacheCategory::LiveScores => self.live_scores,
            CacheCategory::Players => self.players,
            CacheCategory::Standings => self.standings,
            CacheCategory::Transactions => self.transactions,
        }
    }

    /// Replaces the TTL in seconds for a category.
    pub fn set_ttl(&mut self, category: CacheCategory, seconds: u64) {
        let slot = match category {
            CacheCategory::LeagueInfo => &mut self.league_info,
            CacheCategory::Rosters => &mut self.rosters,
            CacheCategory::LiveScores => &mut self.live_scores,
            CacheCategory::Players => &mut self.players,
            CacheCategory::Standings => &mut self.standings,
            CacheCategory::Transactions => &mut self.transactions,
        };
        *slot = seconds;
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            league_info: 3600,
            rosters: 900,
            live_scores: 120,
            players: 86_400,
            standings: 1800,
            transactions: 600,
        }
    }
}
