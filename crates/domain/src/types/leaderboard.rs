//! Leaderboard types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Population a leaderboard is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    /// All users, ranked by total focus minutes.
    #[default]
    Global,
    /// Members of one group, ranked by their total focus minutes.
    Group,
}

impl_domain_status_conversions!(LeaderboardScope {
    Global => "global",
    Group => "group",
});

/// One unranked row: a user or a group and its metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// User or group identifier
    pub id: String,
    /// Name shown to callers
    pub display_name: String,
    /// Value ranked on, higher first
    pub metric_value: i64,
    /// Level of the ranked user
    pub level: i64,
}

impl LeaderboardEntry {
    /// Unranked row.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        metric_value: i64,
        level: i64,
    ) -> Self {
        Self { id: id.into(), display_name: display_name.into(), metric_value, level }
    }
}

/// A leaderboard row with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    /// User or group identifier
    pub id: String,
    /// Name shown to callers
    pub display_name: String,
    /// Value ranked on
    pub metric_value: i64,
    /// Level of the ranked user
    pub level: i64,
    /// Whether this row is the caller
    pub is_current_user: bool,
}

/// A ranked window over one population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    /// Population ranked
    pub scope: LeaderboardScope,
    /// Requested window, best first
    pub entries: Vec<RankedEntry>,
    /// Caller's rank in the full population, present even when outside the
    /// returned window.
    pub caller_rank: Option<usize>,
    /// Size of the ranked population
    pub total_entries: usize,
}
