//! Aggregation engine - folds completed sessions into user and group stats

use std::sync::Arc;

use chrono::NaiveDate;
use focusflow_domain::constants::DEFAULT_AGGREGATION_ATTEMPTS;
use focusflow_domain::{
    contributed_tree_health, level_for_minutes, next_streak, rolled_over_tree_health,
    FocusFlowError, GroupMember, GroupStats, Result,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ports::{CommitOutcome, GroupContribution, UserCredit};
use crate::group::ports::GroupRepository;
use crate::user::ports::UserRepository;
use crate::utils::clock::Clock;

/// Totals after a session has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationOutcome {
    /// The user's lifetime focus minutes after the credit.
    pub new_total_minutes: i64,
    /// Level for the new total.
    pub new_level: i64,
    /// Consecutive UTC days with credited focus time.
    pub streak_days: i64,
    /// Group tree health after the contribution, when the session had a group.
    pub tree_health: Option<i64>,
    /// The user credit had already landed earlier; nothing was added this time.
    pub already_applied: bool,
}

/// Outcome of a tree-health sweep over every group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSweepReport {
    /// Groups looked at.
    pub examined: usize,
    /// Groups whose open day closed during this sweep.
    pub rolled_over: usize,
    /// Groups that could not be rolled over.
    pub failed: usize,
}

/// Applies credited minutes to user and group statistics.
///
/// Each write is conditional on the version that was read. A conflict means
/// someone else committed in between, so the engine re-reads and tries again,
/// up to `max_attempts` times in total.
pub struct AggregationEngine {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl AggregationEngine {
    /// Engine with the default retry budget.
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { users, groups, clock, max_attempts: DEFAULT_AGGREGATION_ATTEMPTS }
    }

    /// Total attempts per write, including the first. Clamped to at least 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Credit `minutes` from `session_id` to `user_id`, then to `group_id`.
    ///
    /// Re-applying a session that was already credited changes nothing. A
    /// user write that lands followed by a failed group write still reports
    /// `AggregationFailed`; a later retry skips the user part via the ledger.
    pub async fn apply_completed_session(
        &self,
        user_id: &str,
        session_id: Uuid,
        minutes: i64,
        group_id: Option<Uuid>,
    ) -> Result<AggregationOutcome> {
        let minutes = minutes.max(0);
        let mut outcome = self.credit_user(user_id, session_id, minutes).await?;

        if let Some(group_id) = group_id {
            outcome.tree_health =
                self.credit_group(group_id, user_id, session_id, minutes).await?;
        }

        info!(
            user_id,
            %session_id,
            minutes,
            new_total_minutes = outcome.new_total_minutes,
            new_level = outcome.new_level,
            already_applied = outcome.already_applied,
            "session aggregated"
        );
        Ok(outcome)
    }

    /// Close the group's open day if a new UTC day has begun, judging it by
    /// the members who contributed during it.
    ///
    /// Calling this again on the same day changes nothing.
    pub async fn refresh_group_health(&self, group_id: Uuid) -> Result<GroupStats> {
        self.roll_over_group(group_id).await.map(|(group, _)| group)
    }

    /// Roll every group over to today.
    ///
    /// A failing group is logged and counted; the sweep carries on with the
    /// rest.
    pub async fn refresh_all_group_health(&self) -> Result<HealthSweepReport> {
        let group_ids = self.groups.list_group_ids().await?;
        let mut report =
            HealthSweepReport { examined: group_ids.len(), ..HealthSweepReport::default() };

        for group_id in group_ids {
            match self.roll_over_group(group_id).await {
                Ok((_, true)) => report.rolled_over += 1,
                Ok((_, false)) => {}
                Err(err) => {
                    warn!(%group_id, error = %err, "group health sweep failed for group");
                    report.failed += 1;
                }
            }
        }

        info!(
            examined = report.examined,
            rolled_over = report.rolled_over,
            failed = report.failed,
            "group health sweep finished"
        );
        Ok(report)
    }

    async fn roll_over_group(&self, group_id: Uuid) -> Result<(GroupStats, bool)> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            let mut group = self
                .groups
                .find_group(group_id)
                .await?
                .ok_or_else(|| FocusFlowError::NotFound(format!("group {group_id}")))?;
            let today = self.clock.now().date_naive();
            if group.health_day >= today {
                return Ok((group, false));
            }

            let members = self.groups.list_members(group_id).await?;
            let health = rolled_over_health(&group, &members, today);

            match self.groups.commit_tree_health(group_id, group.version, health, today).await {
                Ok(CommitOutcome::Committed | CommitOutcome::AlreadyApplied) => {
                    debug!(
                        %group_id,
                        closed_day = %group.health_day,
                        tree_health = health,
                        "group health rolled over"
                    );
                    group.tree_health = health;
                    group.health_day = today;
                    group.version += 1;
                    return Ok((group, true));
                }
                Ok(CommitOutcome::Conflict) => {
                    debug!(%group_id, attempt, "tree health version conflict, retrying");
                    last_reason = "version conflict".to_string();
                }
                Err(err) if is_retryable(&err) => {
                    warn!(%group_id, attempt, error = %err, "tree health write failed, retrying");
                    last_reason = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        error!(%group_id, attempts = self.max_attempts, "group health rollover exhausted retries");
        Err(FocusFlowError::AggregationFailed {
            target: format!("group {group_id}"),
            reason: format!(
                "tree health not refreshed after {} attempts: {last_reason}",
                self.max_attempts
            ),
        })
    }

    async fn credit_user(
        &self,
        user_id: &str,
        session_id: Uuid,
        minutes: i64,
    ) -> Result<AggregationOutcome> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            let user = self
                .users
                .find_user(user_id)
                .await?
                .ok_or_else(|| FocusFlowError::NotFound(format!("user {user_id}")))?;

            let now = self.clock.now();
            let total = user.total_focus_minutes.saturating_add(minutes);
            let credit = UserCredit {
                user_id: user_id.to_string(),
                session_id,
                expected_version: user.version,
                total_focus_minutes: total,
                level: level_for_minutes(total),
                streak_days: next_streak(user.streak_days, user.last_active_at, now),
                last_active_at: now,
            };

            match self.users.commit_user_credit(&credit).await {
                Ok(CommitOutcome::Committed) => {
                    return Ok(AggregationOutcome {
                        new_total_minutes: credit.total_focus_minutes,
                        new_level: credit.level,
                        streak_days: credit.streak_days,
                        tree_health: None,
                        already_applied: false,
                    });
                }
                Ok(CommitOutcome::AlreadyApplied) => {
                    debug!(user_id, %session_id, "session already credited to user");
                    return Ok(AggregationOutcome {
                        new_total_minutes: user.total_focus_minutes,
                        new_level: level_for_minutes(user.total_focus_minutes),
                        streak_days: user.streak_days,
                        tree_health: None,
                        already_applied: true,
                    });
                }
                Ok(CommitOutcome::Conflict) => {
                    debug!(user_id, attempt, "user stats version conflict, retrying");
                    last_reason = "version conflict".to_string();
                }
                Err(err) if is_retryable(&err) => {
                    warn!(user_id, attempt, error = %err, "user stats write failed, retrying");
                    last_reason = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        error!(user_id, %session_id, attempts = self.max_attempts, "user aggregation exhausted retries");
        Err(FocusFlowError::AggregationFailed {
            target: format!("user {user_id}"),
            reason: format!(
                "stats not updated after {} attempts: {last_reason}",
                self.max_attempts
            ),
        })
    }

    async fn credit_group(
        &self,
        group_id: Uuid,
        user_id: &str,
        session_id: Uuid,
        minutes: i64,
    ) -> Result<Option<i64>> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            let Some(group) = self.groups.find_group(group_id).await? else {
                warn!(%group_id, %session_id, "session group no longer exists, skipping group credit");
                return Ok(None);
            };
            let members = self.groups.list_members(group_id).await?;

            let now = self.clock.now();
            let today = now.date_naive();
            let member_count = group.member_count.max(members.len() as i64);
            let base = rolled_over_health(&group, &members, today);
            let active_today = members
                .iter()
                .filter(|member| {
                    if member.user_id == user_id {
                        member.daily_minutes_after(minutes, today) > 0
                    } else {
                        member.contributed_on(today)
                    }
                })
                .count() as i64;
            let health = contributed_tree_health(base, active_today, member_count);

            let contribution = GroupContribution {
                group_id,
                user_id: user_id.to_string(),
                session_id,
                minutes,
                day: today,
                expected_version: group.version,
                tree_health: health,
                health_day: group.health_day.max(today),
                at: now,
            };

            match self.groups.commit_group_contribution(&contribution).await {
                Ok(CommitOutcome::Committed) => {
                    debug!(%group_id, active_today, member_count, tree_health = health, "group credited");
                    return Ok(Some(health));
                }
                Ok(CommitOutcome::AlreadyApplied) => {
                    debug!(%group_id, %session_id, "session already credited to group");
                    return Ok(Some(group.tree_health));
                }
                Ok(CommitOutcome::Conflict) => {
                    debug!(%group_id, attempt, "group stats version conflict, retrying");
                    last_reason = "version conflict".to_string();
                }
                Err(err) if is_retryable(&err) => {
                    warn!(%group_id, attempt, error = %err, "group stats write failed, retrying");
                    last_reason = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        error!(%group_id, %session_id, attempts = self.max_attempts, "group aggregation exhausted retries");
        Err(FocusFlowError::AggregationFailed {
            target: format!("group {group_id}"),
            reason: format!(
                "contribution from {user_id} not applied after {} attempts: {last_reason}",
                self.max_attempts
            ),
        })
    }
}

/// The group's health once its open day is closed as of `today`.
fn rolled_over_health(group: &GroupStats, members: &[GroupMember], today: NaiveDate) -> i64 {
    let member_count = group.member_count.max(members.len() as i64);
    let open_day_active =
        members.iter().filter(|member| member.contributed_on(group.health_day)).count() as i64;
    let elapsed_days = (today - group.health_day).num_days();
    rolled_over_tree_health(group.tree_health, open_day_active, member_count, elapsed_days)
}

/// Store-level failures that a fresh read and retry may clear.
fn is_retryable(err: &FocusFlowError) -> bool {
    matches!(err, FocusFlowError::Database(_))
}
