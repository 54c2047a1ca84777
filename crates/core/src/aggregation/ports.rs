//! Conditional writes used by the aggregation engine
//!
//! Each request carries the `version` the engine read. Stores apply it only if
//! the row still has that version, and record the session id in a credit
//! ledger inside the same transaction so a session is never counted twice.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Result of a versioned, ledger-guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Written; the row version was bumped.
    Committed,
    /// The row changed since it was read. Nothing was written.
    Conflict,
    /// The session is already in the ledger. Nothing was written.
    AlreadyApplied,
}

/// New user totals computed from a snapshot at `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredit {
    /// User credited
    pub user_id: String,
    /// Ledger key; a session is credited at most once
    pub session_id: Uuid,
    /// Version the totals were computed from
    pub expected_version: i64,
    /// New lifetime minutes
    pub total_focus_minutes: i64,
    /// Level for the new total
    pub level: i64,
    /// Streak after this session
    pub streak_days: i64,
    /// Completion time of the session
    pub last_active_at: DateTime<Utc>,
}

/// A member's credited minutes for a group, with the recomputed tree health.
///
/// `minutes` is added in-store to the group total and the member's totals;
/// the member's daily minutes restart when `day` differs from their last
/// contribution day. `tree_health` already includes any rollover to
/// `health_day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupContribution {
    /// Group credited
    pub group_id: Uuid,
    /// Contributing member
    pub user_id: String,
    /// Ledger key; a session is credited at most once
    pub session_id: Uuid,
    /// Minutes added
    pub minutes: i64,
    /// UTC day of the contribution
    pub day: NaiveDate,
    /// Version the health was computed from
    pub expected_version: i64,
    /// New tree health
    pub tree_health: i64,
    /// New open day
    pub health_day: NaiveDate,
    /// Contribution time
    pub at: DateTime<Utc>,
}
