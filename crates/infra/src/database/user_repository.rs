//! User statistics persistence

use std::sync::Arc;

use async_trait::async_trait;
use focusflow_core::aggregation::{CommitOutcome, UserCredit};
use focusflow_core::user::ports::UserRepository as UserRepositoryPort;
use focusflow_domain::{FocusFlowError, LeaderboardEntry, Result as DomainResult, UserStats};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use super::columns::{from_millis, opt_from_millis, opt_millis, to_millis};
use super::manager::{run_blocking, DbManager};

const USER_COLUMNS: &str = "user_id, display_name, total_focus_minutes, level, streak_days, \
     last_active_at, version, created_at";

/// SQLite-backed implementation of `UserRepository`
/// SQLite-backed implementation of `UserRepository`
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn create_user(&self, user: &UserStats) -> DomainResult<()> {
        let user = user.clone();

        run_blocking(&self.db, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    user.user_id,
                    user.display_name,
                    user.total_focus_minutes,
                    user.level,
                    user.streak_days,
                    opt_millis(user.last_active_at),
                    user.version,
                    to_millis(user.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, user_id: &str) -> DomainResult<Option<UserStats>> {
        let user_id = user_id.to_string();

        run_blocking(&self.db, move |conn| {
            let user = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                    params![user_id],
                    map_user_row,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn commit_user_credit(&self, credit: &UserCredit) -> DomainResult<CommitOutcome> {
        let credit = credit.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let session_id = credit.session_id.to_string();

            let credited: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM credited_sessions WHERE session_id = ?1)",
                params![session_id],
                |row| row.get(0),
            )?;
            if credited {
                return Ok(CommitOutcome::AlreadyApplied);
            }

            let updated = tx.execute(
                "UPDATE users
                 SET total_focus_minutes = ?1, level = ?2, streak_days = ?3,
                     last_active_at = ?4, version = version + 1
                 WHERE user_id = ?5 AND version = ?6",
                params![
                    credit.total_focus_minutes,
                    credit.level,
                    credit.streak_days,
                    to_millis(credit.last_active_at),
                    credit.user_id,
                    credit.expected_version,
                ],
            )?;

            if updated == 0 {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1)",
                    params![credit.user_id],
                    |row| row.get(0),
                )?;
                return if exists {
                    Ok(CommitOutcome::Conflict)
                } else {
                    Err(FocusFlowError::NotFound(format!("user {}", credit.user_id)).into())
                };
            }

            tx.execute(
                "INSERT INTO credited_sessions (session_id, user_id, credited_at) VALUES (?1, ?2, ?3)",
                params![session_id, credit.user_id, to_millis(credit.last_active_at)],
            )?;
            tx.commit()?;
            Ok(CommitOutcome::Committed)
        })
        .await
    }

    async fn list_user_entries(&self) -> DomainResult<Vec<LeaderboardEntry>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, display_name, total_focus_minutes, level FROM users
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let entries = stmt
                .query_map([], map_entry_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserStats> {
    Ok(UserStats {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        total_focus_minutes: row.get(2)?,
        level: row.get(3)?,
        streak_days: row.get(4)?,
        last_active_at: opt_from_millis(5, row.get(5)?)?,
        version: row.get(6)?,
        created_at: from_millis(7, row.get(7)?)?,
    })
}

/// `(id, display_name, metric_value, level)` in column order.
pub(crate) fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<LeaderboardEntry> {
    let id: String = row.get(0)?;
    let display_name: String = row.get(1)?;
    Ok(LeaderboardEntry::new(&id, &display_name, row.get(2)?, row.get(3)?))
}
