//! Focus session types
//!
//! A session moves `active → completed` exactly once. `end_time` is populated
//! if and only if the session is completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_SESSION_GOAL, MINUTES_PER_LEVEL};
use crate::errors::{FocusFlowError, Result};
use crate::impl_domain_status_conversions;

/// Lifecycle status of a focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl_domain_status_conversions!(SessionStatus {
    Active => "active",
    Completed => "completed",
});

/// A bounded period of focused work owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    /// Time-ordered identifier
    pub session_id: Uuid,
    /// Owner; only they may act on the session
    pub user_id: String,
    /// Group credited on completion, if any
    pub group_id: Option<Uuid>,
    /// Free-text intention stated at start
    pub goal: String,
    /// Server time at start
    pub start_time: DateTime<Utc>,
    /// Set once, at completion
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed wall-clock seconds, set at completion.
    pub duration_seconds: i64,
    /// Lifecycle state
    pub status: SessionStatus,
    /// Accumulated signed minute adjustment from score policy.
    pub focus_adjustment: i64,
    /// Most recent score that went through the adjustment policy
    pub last_focus_score: Option<i64>,
    /// When `last_focus_score` was applied
    pub last_adjustment_at: Option<DateTime<Utc>>,
    /// Sum of all recorded scores
    pub total_focus_score: i64,
    /// Number of recorded scores
    pub score_count: i64,
    /// Rounded mean of recorded scores
    pub average_focus_score: i64,
    /// Whether the completed session has been folded into user/group stats.
    pub stats_applied: bool,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl FocusSession {
    /// Create a fresh active session starting at `now`.
    pub fn start(
        user_id: impl Into<String>,
        group_id: Option<Uuid>,
        goal: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let goal = goal
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_GOAL.to_string());

        Self {
            session_id: Uuid::now_v7(),
            user_id: user_id.into(),
            group_id,
            goal,
            start_time: now,
            end_time: None,
            duration_seconds: 0,
            status: SessionStatus::Active,
            focus_adjustment: 0,
            last_focus_score: None,
            last_adjustment_at: None,
            total_focus_score: 0,
            score_count: 0,
            average_focus_score: 0,
            stats_applied: false,
            created_at: now,
        }
    }

    /// Whether the session still accepts scores and adjustments.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Fail with `Forbidden` unless `caller_id` owns this session.
    pub fn ensure_owned_by(&self, caller_id: &str) -> Result<()> {
        if self.user_id == caller_id {
            Ok(())
        } else {
            Err(FocusFlowError::Forbidden(format!(
                "session {} belongs to another user",
                self.session_id
            )))
        }
    }

    /// Fail with `InvalidState` unless the session is still active.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(FocusFlowError::InvalidState(format!(
                "session {} is {}",
                self.session_id, self.status
            )))
        }
    }

    /// Whole seconds between start and `now`, never negative.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_seconds().max(0)
    }

    /// Current running score totals.
    pub fn score_stats(&self) -> SessionScoreStats {
        SessionScoreStats {
            total_focus_score: self.total_focus_score,
            score_count: self.score_count,
            average_focus_score: self.average_focus_score,
        }
    }
}

/// Running score totals for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScoreStats {
    /// Sum of recorded scores
    pub total_focus_score: i64,
    /// Number of recorded scores
    pub score_count: i64,
    /// Rounded mean, zero when nothing was recorded
    pub average_focus_score: i64,
}

/// Minutes credited for a completed session.
///
/// `floor(seconds / 60) + adjustment`, clamped at zero so a large penalty can
/// never remove time already credited elsewhere.
pub fn credited_minutes(duration_seconds: i64, adjustment: i64) -> i64 {
    let base = duration_seconds.max(0) / 60;
    base.saturating_add(adjustment).max(0)
}

/// Level derived from cumulative focus minutes: one level per hour, starting at 1.
pub fn level_for_minutes(total_minutes: i64) -> i64 {
    total_minutes.max(0) / MINUTES_PER_LEVEL + 1
}

/// Rounded mean of `sum / count` (half rounds up); zero when `count` is zero.
pub fn average_score(sum: i64, count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (2 * sum + count).div_euclid(2 * count)
}
