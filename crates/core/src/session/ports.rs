//! Port interfaces for session persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use focusflow_domain::{FocusScoreRecord, FocusSession, Result, SessionScoreStats};
use serde::Serialize;
use uuid::Uuid;

/// Position in a user's history, which is ordered by `start_time` then
/// `session_id`, both descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCursor {
    /// Sessions must have started at or before this instant.
    pub start_time: DateTime<Utc>,
    /// Tie-break among sessions sharing `start_time`. Without it the whole
    /// instant is skipped.
    pub session_id: Option<Uuid>,
}

impl SessionCursor {
    /// Cursor that resumes right after `session`.
    pub fn after(session: &FocusSession) -> Self {
        Self { start_time: session.start_time, session_id: Some(session.session_id) }
    }

    /// Whether a session at (`start_time`, `session_id`) lies past the cursor.
    pub fn admits(&self, start_time: DateTime<Utc>, session_id: Uuid) -> bool {
        start_time < self.start_time
            || (start_time == self.start_time
                && self.session_id.is_some_and(|cursor_id| session_id < cursor_id))
    }
}

/// Storage for focus sessions and their score records.
///
/// Every mutation of an active session is conditional on `status = active`
/// and applied as an in-store increment, so concurrent calls for the same
/// session never lose updates and nothing changes after completion.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, session: &FocusSession) -> Result<()>;

    async fn find_session(&self, session_id: Uuid) -> Result<Option<FocusSession>>;

    /// The user's sessions, newest first, optionally only those past
    /// `before`.
    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: usize,
        before: Option<SessionCursor>,
    ) -> Result<Vec<FocusSession>>;

    /// Append `record` and fold its score into the session's running totals.
    ///
    /// Returns `None` without writing anything if the session is no longer
    /// active.
    async fn record_score(&self, record: &FocusScoreRecord) -> Result<Option<SessionScoreStats>>;

    /// Add `delta` to the session's adjustment and remember `focus_score`.
    ///
    /// Returns the new total adjustment, or `None` if the session is no longer
    /// active.
    async fn apply_adjustment(
        &self,
        session_id: Uuid,
        delta: i64,
        focus_score: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<i64>>;

    /// Transition `active → completed`.
    ///
    /// Returns the completed session as stored, or `None` if it was not
    /// active when the write happened.
    async fn complete_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Result<Option<FocusSession>>;

    async fn mark_stats_applied(&self, session_id: Uuid) -> Result<()>;

    /// Completed sessions whose statistics have not been applied yet, oldest
    /// first.
    async fn list_unapplied_sessions(&self, limit: usize) -> Result<Vec<FocusSession>>;

    async fn list_scores(&self, session_id: Uuid) -> Result<Vec<FocusScoreRecord>>;
}
