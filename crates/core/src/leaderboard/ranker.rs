//! Pure leaderboard ranking

use focusflow_domain::{Leaderboard, LeaderboardEntry, LeaderboardScope, RankedEntry};

/// Rank `entries` by descending metric, keeping input order among ties.
///
/// Ranks are 1-based positions in the sorted order. `is_current_user` is
/// true only for the entry whose id equals `caller_id`.
pub fn rank(entries: Vec<LeaderboardEntry>, caller_id: &str) -> Vec<RankedEntry> {
    let mut entries = entries;
    // `sort_by` is stable, so equal metrics keep their input order.
    entries.sort_by(|a, b| b.metric_value.cmp(&a.metric_value));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| RankedEntry {
            rank: index + 1,
            is_current_user: entry.id == caller_id,
            id: entry.id,
            display_name: entry.display_name,
            metric_value: entry.metric_value,
            level: entry.level,
        })
        .collect()
}

/// Rank the whole population, then cut it to the first `limit` rows.
///
/// `caller_rank` is taken from the full ranking, so it is reported even when
/// the caller falls outside the returned window.
pub fn build_leaderboard(
    scope: LeaderboardScope,
    entries: Vec<LeaderboardEntry>,
    caller_id: &str,
    limit: usize,
) -> Leaderboard {
    let mut ranked = rank(entries, caller_id);
    let total_entries = ranked.len();
    let caller_rank = ranked.iter().find(|entry| entry.is_current_user).map(|entry| entry.rank);
    ranked.truncate(limit);

    Leaderboard { scope, entries: ranked, caller_rank, total_entries }
}
