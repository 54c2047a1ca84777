//! Domain types and models

pub mod leaderboard;
pub mod score;
pub mod session;
pub mod stats;

pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardScope, RankedEntry};
pub use score::{clamp_score, Classification, FocusScoreRecord};
pub use session::{
    average_score, credited_minutes, level_for_minutes, FocusSession, SessionScoreStats,
    SessionStatus,
};
pub use stats::{
    adherence_percent, contributed_tree_health, next_streak, next_tree_health,
    rolled_over_tree_health, GroupMember, GroupStats, MemberRole, UserStats,
};
