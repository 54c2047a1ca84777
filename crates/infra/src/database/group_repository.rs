//! Study group and membership persistence

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use focusflow_core::aggregation::{CommitOutcome, GroupContribution};
use focusflow_core::group::ports::GroupRepository as GroupRepositoryPort;
use focusflow_domain::{
    FocusFlowError, GroupMember, GroupStats, LeaderboardEntry, MemberRole,
    Result as DomainResult,
};
use rusqlite::{
    params, params_from_iter, OptionalExtension, Row, ToSql, Transaction, TransactionBehavior,
};
use uuid::Uuid;

use super::columns::{
    day_to_text, from_millis, opt_from_millis, opt_millis, opt_parse_day, parse_day, parse_enum,
    parse_uuid, to_millis,
};
use super::manager::{run_blocking, DbManager};
use super::user_repository::map_entry_row;
use crate::errors::InfraError;

const GROUP_COLUMNS: &str = "group_id, name, owner_id, daily_goal_minutes, member_count, \
     total_focus_minutes, tree_health, health_day, version, created_at, last_active_at";

const MEMBER_COLUMNS: &str = "group_id, user_id, role, joined_at, total_contribution_minutes, \
     daily_contribution_minutes, contribution_day";

/// SQLite-backed implementation of `GroupRepository`
pub struct SqliteGroupRepository {
    db: Arc<DbManager>,
}

impl SqliteGroupRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupRepositoryPort for SqliteGroupRepository {
    async fn create_group(&self, group: &GroupStats, owner: &GroupMember) -> DomainResult<()> {
        let group = group.clone();
        let owner = owner.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                &format!(
                    "INSERT INTO study_groups ({GROUP_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    group.group_id.to_string(),
                    group.name,
                    group.owner_id,
                    group.daily_goal_minutes,
                    group.member_count,
                    group.total_focus_minutes,
                    group.tree_health,
                    day_to_text(group.health_day),
                    group.version,
                    to_millis(group.created_at),
                    opt_millis(group.last_active_at),
                ],
            )?;
            insert_member(&tx, &owner)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn find_group(&self, group_id: Uuid) -> DomainResult<Option<GroupStats>> {
        run_blocking(&self.db, move |conn| {
            let group = conn
                .query_row(
                    &format!("SELECT {GROUP_COLUMNS} FROM study_groups WHERE group_id = ?1"),
                    params![group_id.to_string()],
                    map_group_row,
                )
                .optional()?;
            Ok(group)
        })
        .await
    }

    async fn list_group_ids(&self) -> DomainResult<Vec<Uuid>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt =
                conn.prepare("SELECT group_id FROM study_groups ORDER BY created_at ASC, rowid ASC")?;
            let ids = stmt
                .query_map([], |row| {
                    let raw: String = row.get(0)?;
                    parse_uuid(0, &raw)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn find_member(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> DomainResult<Option<GroupMember>> {
        let user_id = user_id.to_string();

        run_blocking(&self.db, move |conn| {
            let member = conn
                .query_row(
                    &format!(
                        "SELECT {MEMBER_COLUMNS} FROM group_members
                         WHERE group_id = ?1 AND user_id = ?2"
                    ),
                    params![group_id.to_string(), user_id],
                    map_member_row,
                )
                .optional()?;
            Ok(member)
        })
        .await
    }

    async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<GroupMember>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM group_members
                 WHERE group_id = ?1
                 ORDER BY joined_at ASC, rowid ASC"
            ))?;
            let members = stmt
                .query_map(params![group_id.to_string()], map_member_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(members)
        })
        .await
    }

    async fn add_member(&self, member: &GroupMember) -> DomainResult<bool> {
        let member = member.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let group_id = member.group_id.to_string();

            if !group_exists(&tx, &group_id)? {
                return Err(FocusFlowError::NotFound(format!("group {group_id}")).into());
            }

            let inserted = tx.execute(
                &format!(
                    "INSERT OR IGNORE INTO group_members ({MEMBER_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params_from_iter(member_params(&member)),
            )?;
            if inserted == 0 {
                return Ok(false);
            }

            tx.execute(
                "UPDATE study_groups
                 SET member_count = member_count + 1, version = version + 1
                 WHERE group_id = ?1",
                params![group_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    async fn commit_group_contribution(
        &self,
        contribution: &GroupContribution,
    ) -> DomainResult<CommitOutcome> {
        let contribution = contribution.clone();

        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let session_id = contribution.session_id.to_string();
            let group_id = contribution.group_id.to_string();

            let credited: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM group_credited_sessions WHERE session_id = ?1)",
                params![session_id],
                |row| row.get(0),
            )?;
            if credited {
                return Ok(CommitOutcome::AlreadyApplied);
            }

            let updated = tx.execute(
                "UPDATE study_groups
                 SET total_focus_minutes = total_focus_minutes + ?1,
                     tree_health = ?2,
                     health_day = ?3,
                     last_active_at = ?4,
                     version = version + 1
                 WHERE group_id = ?5 AND version = ?6",
                params![
                    contribution.minutes,
                    contribution.tree_health,
                    day_to_text(contribution.health_day),
                    to_millis(contribution.at),
                    group_id,
                    contribution.expected_version,
                ],
            )?;
            if updated == 0 {
                return missing_or_conflict(&tx, &group_id);
            }

            tx.execute(
                "UPDATE group_members
                 SET daily_contribution_minutes = CASE
                         WHEN contribution_day = ?1 THEN daily_contribution_minutes + ?2
                         ELSE ?2
                     END,
                     total_contribution_minutes = total_contribution_minutes + ?2,
                     contribution_day = ?1
                 WHERE group_id = ?3 AND user_id = ?4",
                params![
                    day_to_text(contribution.day),
                    contribution.minutes,
                    group_id,
                    contribution.user_id,
                ],
            )?;
            tx.execute(
                "INSERT INTO group_credited_sessions (session_id, group_id, credited_at)
                 VALUES (?1, ?2, ?3)",
                params![session_id, group_id, to_millis(contribution.at)],
            )?;
            tx.commit()?;
            Ok(CommitOutcome::Committed)
        })
        .await
    }

    async fn commit_tree_health(
        &self,
        group_id: Uuid,
        expected_version: i64,
        tree_health: i64,
        health_day: NaiveDate,
    ) -> DomainResult<CommitOutcome> {
        run_blocking(&self.db, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let group_id = group_id.to_string();

            let updated = tx.execute(
                "UPDATE study_groups
                 SET tree_health = ?1, health_day = ?2, version = version + 1
                 WHERE group_id = ?3 AND version = ?4",
                params![tree_health, day_to_text(health_day), group_id, expected_version],
            )?;
            if updated == 0 {
                return missing_or_conflict(&tx, &group_id);
            }
            tx.commit()?;
            Ok(CommitOutcome::Committed)
        })
        .await
    }

    async fn list_member_entries(&self, group_id: Uuid) -> DomainResult<Vec<LeaderboardEntry>> {
        run_blocking(&self.db, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT u.user_id, u.display_name, u.total_focus_minutes, u.level
                 FROM group_members m
                 JOIN users u ON u.user_id = m.user_id
                 WHERE m.group_id = ?1
                 ORDER BY m.joined_at ASC, m.rowid ASC",
            )?;
            let entries = stmt
                .query_map(params![group_id.to_string()], map_entry_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }
}

fn insert_member(tx: &Transaction<'_>, member: &GroupMember) -> rusqlite::Result<usize> {
    tx.execute(
        &format!(
            "INSERT INTO group_members ({MEMBER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params_from_iter(member_params(member)),
    )
}

fn member_params(member: &GroupMember) -> [Box<dyn ToSql>; 7] {
    [
        Box::new(member.group_id.to_string()),
        Box::new(member.user_id.clone()),
        Box::new(member.role.to_string()),
        Box::new(to_millis(member.joined_at)),
        Box::new(member.total_contribution_minutes),
        Box::new(member.daily_contribution_minutes),
        Box::new(member.contribution_day.map(day_to_text)),
    ]
}

fn group_exists(tx: &Transaction<'_>, group_id: &str) -> rusqlite::Result<bool> {
    tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM study_groups WHERE group_id = ?1)",
        params![group_id],
        |row| row.get(0),
    )
}

/// A guarded update touched no row: the group is gone or its version moved.
fn missing_or_conflict(
    tx: &Transaction<'_>,
    group_id: &str,
) -> Result<CommitOutcome, InfraError> {
    if group_exists(tx, group_id)? {
        Ok(CommitOutcome::Conflict)
    } else {
        Err(FocusFlowError::NotFound(format!("group {group_id}")).into())
    }
}

fn map_group_row(row: &Row<'_>) -> rusqlite::Result<GroupStats> {
    let group_id: String = row.get(0)?;
    let health_day: String = row.get(7)?;

    Ok(GroupStats {
        group_id: parse_uuid(0, &group_id)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        daily_goal_minutes: row.get(3)?,
        member_count: row.get(4)?,
        total_focus_minutes: row.get(5)?,
        tree_health: row.get(6)?,
        health_day: parse_day(7, &health_day)?,
        version: row.get(8)?,
        created_at: from_millis(9, row.get(9)?)?,
        last_active_at: opt_from_millis(10, row.get(10)?)?,
    })
}

fn map_member_row(row: &Row<'_>) -> rusqlite::Result<GroupMember> {
    let group_id: String = row.get(0)?;
    let role: String = row.get(2)?;

    Ok(GroupMember {
        group_id: parse_uuid(0, &group_id)?,
        user_id: row.get(1)?,
        role: parse_enum::<MemberRole>(2, &role)?,
        joined_at: from_millis(3, row.get(3)?)?,
        total_contribution_minutes: row.get(4)?,
        daily_contribution_minutes: row.get(5)?,
        contribution_day: opt_parse_day(6, row.get(6)?)?,
    })
}
