//! Focus session and score persistence
//!
//! Score aggregates and minute adjustments are applied with single guarded
//! `UPDATE ... RETURNING` statements, so concurrent writers never lose each
//! other's increments and nothing lands on a completed session.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use focusflow_core::session::ports::{SessionCursor, SessionRepository as SessionRepositoryPort};
use focusflow_domain::{
    FocusScoreRecord, FocusSession, Result as DomainResult, SessionScoreStats, SessionStatus,
};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use super::columns::{
    from_millis, opt_from_millis, opt_millis, parse_enum, parse_uuid, to_millis,
};
use super::manager::{run_blocking, DbManager};

const SESSION_COLUMNS: &str = "session_id, user_id, group_id, goal, start_time, end_time, \
     duration_seconds, status, focus_adjustment, last_focus_score, last_adjustment_at, \
     total_focus_score, score_count, average_focus_score, stats_applied, created_at";

const SCORE_COLUMNS: &str = "score_id, session_id, user_id, focus_score, explanation, category, \
     is_productive, observed_at, created_at";

/// SQLite-backed implementation of `SessionRepository`
pub struct SqliteSessionRepository {
    db: Arc<DbManager>,
}

impl SqliteSessionRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepositoryPort for SqliteSessionRepository {
    async fn insert_session(&self, session: &FocusSession) -> DomainResult<()> {
        let session = session.clone();

        run_blocking(&self.db, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO focus_sessions ({SESSION_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                params![
                    session.session_id.to_string(),
                    session.user_id,
                    session.group_id.map(|id| id.to_string()),
                    session.goal,
                    to_millis(session.start_time),
                    opt_millis(session.end_time),
                    session.duration_seconds,
                    session.status.to_string(),
                    session.focus_adjustment,
                    session.last_focus_score,
                    opt_millis(session.last_adjustment_at),
                    session.total_focus_score,
                    session.score_count,
                    session.average_focus_score,
                    session.stats_applied,
                    to_millis(session.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn find_session(&self, session_id: Uuid) -> DomainResult<Option<FocusSession>> {
        run_blocking(&self.db, move |conn| {
            let session = conn
                .query_row(
                    &format!("SELECT {SESSION_COLUMNS} FROM focus_sessions WHERE session_id = ?1"),
                    params![session_id.to_string()],
                    map_session_row,
                )
                .optional()?;
            Ok(session)
        })
        .await
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: usize,
        before: Option<SessionCursor>,
    ) -> DomainResult<Vec<FocusSession>> {
        let user_id = user_id.to_string();
        let before_time = opt_millis(before.map(|cursor| cursor.start_time));
        let before_id = before.and_then(|cursor| cursor.session_id).map(|id| id.to_string());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM focus_sessions
                 WHERE user_id = ?1
                   AND (?2 IS NULL
                        OR start_time < ?2
                        OR (start_time = ?2 AND ?3 IS NOT NULL AND session_id < ?3))
                 ORDER BY start_time DESC, session_id DESC
                 LIMIT ?4"
            ))?;
            let sessions = stmt
                .query_map(params![user_id, before_time, before_id, limit], map_session_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await
    }

    async fn record_score(
        &self,
        record: &FocusScoreRecord,
    ) -> DomainResult<Option<SessionScoreStats>> {
        let record = record.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            // SET expressions read the pre-update row, so the average is
            // computed from the new sum and count with half-up rounding.
            let stats = tx
                .query_row(
                    "UPDATE focus_sessions
                     SET total_focus_score = total_focus_score + ?1,
                         score_count = score_count + 1,
                         average_focus_score =
                             (2 * (total_focus_score + ?1) + (score_count + 1)) / (2 * (score_count + 1)),
                         last_focus_score = ?1
                     WHERE session_id = ?2 AND status = 'active'
                     RETURNING total_focus_score, score_count, average_focus_score",
                    params![record.focus_score, record.session_id.to_string()],
                    |row| {
                        Ok(SessionScoreStats {
                            total_focus_score: row.get(0)?,
                            score_count: row.get(1)?,
                            average_focus_score: row.get(2)?,
                        })
                    },
                )
                .optional()?;

            let Some(stats) = stats else {
                return Ok(None);
            };

            tx.execute(
                &format!(
                    "INSERT INTO focus_scores ({SCORE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    record.score_id.to_string(),
                    record.session_id.to_string(),
                    record.user_id,
                    record.focus_score,
                    record.explanation,
                    record.category,
                    record.is_productive,
                    to_millis(record.observed_at),
                    to_millis(record.created_at),
                ],
            )?;
            tx.commit()?;
            Ok(Some(stats))
        })
        .await
    }

    async fn apply_adjustment(
        &self,
        session_id: Uuid,
        delta: i64,
        focus_score: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<i64>> {
        run_blocking(&self.db, move |conn| {
            let total = conn
                .query_row(
                    "UPDATE focus_sessions
                     SET focus_adjustment = focus_adjustment + ?1,
                         last_focus_score = ?2,
                         last_adjustment_at = ?3
                     WHERE session_id = ?4 AND status = 'active'
                     RETURNING focus_adjustment",
                    params![delta, focus_score, to_millis(at), session_id.to_string()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(total)
        })
        .await
    }

    async fn complete_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration_seconds: i64,
    ) -> DomainResult<Option<FocusSession>> {
        run_blocking(&self.db, move |conn| {
            let session = conn
                .query_row(
                    &format!(
                        "UPDATE focus_sessions
                         SET status = 'completed', end_time = ?1, duration_seconds = ?2
                         WHERE session_id = ?3 AND status = 'active'
                         RETURNING {SESSION_COLUMNS}"
                    ),
                    params![to_millis(end_time), duration_seconds, session_id.to_string()],
                    map_session_row,
                )
                .optional()?;
            Ok(session)
        })
        .await
    }

    async fn mark_stats_applied(&self, session_id: Uuid) -> DomainResult<()> {
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "UPDATE focus_sessions SET stats_applied = 1 WHERE session_id = ?1",
                params![session_id.to_string()],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_unapplied_sessions(&self, limit: usize) -> DomainResult<Vec<FocusSession>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM focus_sessions
                 WHERE status = 'completed' AND stats_applied = 0
                 ORDER BY end_time ASC
                 LIMIT ?1"
            ))?;
            let sessions = stmt
                .query_map(params![limit], map_session_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await
    }

    async fn list_scores(&self, session_id: Uuid) -> DomainResult<Vec<FocusScoreRecord>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCORE_COLUMNS} FROM focus_scores
                 WHERE session_id = ?1
                 ORDER BY observed_at ASC, rowid ASC"
            ))?;
            let scores = stmt
                .query_map(params![session_id.to_string()], map_score_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(scores)
        })
        .await
    }
}

fn map_session_row(row: &Row<'_>) -> rusqlite::Result<FocusSession> {
    let session_id: String = row.get(0)?;
    let group_id: Option<String> = row.get(2)?;
    let status: String = row.get(7)?;

    Ok(FocusSession {
        session_id: parse_uuid(0, &session_id)?,
        user_id: row.get(1)?,
        group_id: group_id.as_deref().map(|raw| parse_uuid(2, raw)).transpose()?,
        goal: row.get(3)?,
        start_time: from_millis(4, row.get(4)?)?,
        end_time: opt_from_millis(5, row.get(5)?)?,
        duration_seconds: row.get(6)?,
        status: parse_enum::<SessionStatus>(7, &status)?,
        focus_adjustment: row.get(8)?,
        last_focus_score: row.get(9)?,
        last_adjustment_at: opt_from_millis(10, row.get(10)?)?,
        total_focus_score: row.get(11)?,
        score_count: row.get(12)?,
        average_focus_score: row.get(13)?,
        stats_applied: row.get(14)?,
        created_at: from_millis(15, row.get(15)?)?,
    })
}

fn map_score_row(row: &Row<'_>) -> rusqlite::Result<FocusScoreRecord> {
    let score_id: String = row.get(0)?;
    let session_id: String = row.get(1)?;

    Ok(FocusScoreRecord {
        score_id: parse_uuid(0, &score_id)?,
        session_id: parse_uuid(1, &session_id)?,
        user_id: row.get(2)?,
        focus_score: row.get(3)?,
        explanation: row.get(4)?,
        category: row.get(5)?,
        is_productive: row.get(6)?,
        observed_at: from_millis(7, row.get(7)?)?,
        created_at: from_millis(8, row.get(8)?)?,
    })
}
