//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Scoring
/// Lowest focus score
pub const MIN_FOCUS_SCORE: i64 = 0;
/// Highest focus score
pub const MAX_FOCUS_SCORE: i64 = 100;
/// Score given when nothing points either way
pub const NEUTRAL_FOCUS_SCORE: i64 = 50;

// Leveling: one level per hour of credited focus time
/// Credited minutes per level
pub const MINUTES_PER_LEVEL: i64 = 60;

// Adjustment policy defaults (minutes)
/// Lowest score earning the bonus
pub const DEFAULT_BONUS_THRESHOLD: i64 = 70;
/// Minutes added by the bonus
pub const DEFAULT_BONUS_MINUTES: i64 = 10;
/// Scores below this cost the penalty
pub const DEFAULT_PENALTY_THRESHOLD: i64 = 40;
/// Minutes removed by the penalty
pub const DEFAULT_PENALTY_MINUTES: i64 = 20;

// Tree health bounds
/// Wilted tree
pub const MIN_TREE_HEALTH: i64 = 0;
/// Healthy tree
pub const MAX_TREE_HEALTH: i64 = 100;

// Groups
/// Daily goal of a new group
pub const DEFAULT_DAILY_GOAL_MINUTES: i64 = 60;

// Sessions
/// Goal used when a session starts without one
pub const DEFAULT_SESSION_GOAL: &str = "Focus session";
/// History page size when none is requested
pub const DEFAULT_SESSION_PAGE_SIZE: usize = 20;
/// Largest history page
pub const MAX_SESSION_PAGE_SIZE: usize = 100;

// Leaderboard
/// Leaderboard window when none is requested
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
/// Largest leaderboard window
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

// Aggregation
/// Commit attempts per rollup before giving up
pub const DEFAULT_AGGREGATION_ATTEMPTS: u32 = 3;

// Classifier
/// Deadline for one AI judge call
pub const DEFAULT_CLASSIFIER_TIMEOUT_MS: u64 = 8_000;
