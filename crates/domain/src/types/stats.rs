//! Rolled-up statistics for users and groups
//!
//! Both records carry an optimistic `version` counter; every committed update
//! bumps it, and writers must present the version they read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_TREE_HEALTH, MIN_TREE_HEALTH};
use crate::impl_domain_status_conversions;
use crate::types::session::level_for_minutes;

/* -------------------------------------------------------------------------- */
/* User Statistics */
/* -------------------------------------------------------------------------- */

/// Per-user cumulative focus statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Caller identity as presented to the API
    pub user_id: String,
    /// Name shown on leaderboards
    pub display_name: String,
    /// Cumulative credited focus minutes.
    pub total_focus_minutes: i64,
    /// Cached `level_for_minutes(total_focus_minutes)`, rewritten on every update.
    pub level: i64,
    /// Consecutive UTC days with at least one completed session.
    pub streak_days: i64,
    /// Completion time of the latest credited session
    pub last_active_at: Option<DateTime<Utc>>,
    /// Bumped by every committed update
    pub version: i64,
    /// First time the user was seen
    pub created_at: DateTime<Utc>,
}

impl UserStats {
    /// Fresh user at level 1 with no activity.
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            total_focus_minutes: 0,
            level: level_for_minutes(0),
            streak_days: 0,
            last_active_at: None,
            version: 0,
            created_at: now,
        }
    }
}

/// Streak after activity at `now`.
///
/// Same day keeps the streak (at least 1), the following day extends it, any
/// longer gap restarts it at 1.
pub fn next_streak(current: i64, last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let today = now.date_naive();
    match last_active_at.map(|t| t.date_naive()) {
        Some(day) if day == today => current.max(1),
        Some(day) if day.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}

/* -------------------------------------------------------------------------- */
/* Group Statistics */
/* -------------------------------------------------------------------------- */

/// A study group and its shared tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    /// Group identifier
    pub group_id: Uuid,
    /// Display name
    pub name: String,
    /// Creator, also the first member
    pub owner_id: String,
    /// Minutes the group aims for each day
    pub daily_goal_minutes: i64,
    /// Current number of members
    pub member_count: i64,
    /// Minutes credited by all members
    pub total_focus_minutes: i64,
    /// Bounded to `[0, 100]`.
    pub tree_health: i64,
    /// The open UTC day. Adherence of every earlier day is already reflected
    /// in `tree_health`.
    pub health_day: NaiveDate,
    /// Bumped by every committed update
    pub version: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the latest contribution
    pub last_active_at: Option<DateTime<Utc>>,
}

impl GroupStats {
    /// New group with its creator as the only member and a full-health tree.
    pub fn new(
        name: impl Into<String>,
        owner_id: impl Into<String>,
        daily_goal_minutes: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            group_id: Uuid::now_v7(),
            name: name.into(),
            owner_id: owner_id.into(),
            daily_goal_minutes,
            member_count: 1,
            total_focus_minutes: 0,
            tree_health: MAX_TREE_HEALTH,
            health_day: now.date_naive(),
            version: 0,
            created_at: now,
            last_active_at: Some(now),
        }
    }
}

/// Role of a user within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Created the group
    Owner,
    /// Joined later
    Member,
}

impl_domain_status_conversions!(MemberRole {
    Owner => "owner",
    Member => "member",
});

/// A user's attributed contribution to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Group joined
    pub group_id: Uuid,
    /// Member identity
    pub user_id: String,
    /// Owner or plain member
    pub role: MemberRole,
    /// Join time
    pub joined_at: DateTime<Utc>,
    /// Minutes credited to the group over all time
    pub total_contribution_minutes: i64,
    /// Minutes credited on `contribution_day`
    pub daily_contribution_minutes: i64,
    /// UTC day of the latest contribution
    pub contribution_day: Option<NaiveDate>,
}

impl GroupMember {
    /// Member with no contributions yet.
    pub fn new(group_id: Uuid, user_id: impl Into<String>, role: MemberRole, now: DateTime<Utc>) -> Self {
        Self {
            group_id,
            user_id: user_id.into(),
            role,
            joined_at: now,
            total_contribution_minutes: 0,
            daily_contribution_minutes: 0,
            contribution_day: None,
        }
    }

    /// Whether this member credited any minutes on `day`.
    pub fn contributed_on(&self, day: NaiveDate) -> bool {
        self.contribution_day == Some(day) && self.daily_contribution_minutes > 0
    }

    /// Daily minutes after crediting `minutes` on `day`.
    pub fn daily_minutes_after(&self, minutes: i64, day: NaiveDate) -> i64 {
        if self.contribution_day == Some(day) {
            self.daily_contribution_minutes + minutes
        } else {
            minutes
        }
    }
}

/// Share of members active today, as a rounded percentage.
pub fn adherence_percent(active_members: i64, member_count: i64) -> i64 {
    if member_count <= 0 {
        return 0;
    }
    let active = active_members.clamp(0, member_count);
    (200 * active + member_count).div_euclid(2 * member_count)
}

/// Tree health after judging one day's adherence.
///
/// Moves halfway from the current health toward the adherence percentage.
/// Monotone in `active_members` and always within `[0, 100]`.
pub fn next_tree_health(current: i64, active_members: i64, member_count: i64) -> i64 {
    let current = current.clamp(MIN_TREE_HEALTH, MAX_TREE_HEALTH);
    let target = adherence_percent(active_members, member_count);
    let sum = current + target;
    ((sum + 1).div_euclid(2)).clamp(MIN_TREE_HEALTH, MAX_TREE_HEALTH)
}

/// Tree health once the open day closes and `elapsed_days` new days begin.
///
/// The open day is judged by its `open_day_active` members. The days after
/// it that are already over saw no contribution at all, since a contribution
/// would have rolled the group over, so each of them is judged at zero
/// adherence.
pub fn rolled_over_tree_health(
    current: i64,
    open_day_active: i64,
    member_count: i64,
    elapsed_days: i64,
) -> i64 {
    if elapsed_days <= 0 {
        return current.clamp(MIN_TREE_HEALTH, MAX_TREE_HEALTH);
    }

    let mut health = next_tree_health(current, open_day_active, member_count);
    for _ in 1..elapsed_days {
        let next = next_tree_health(health, 0, member_count);
        if next == health {
            break;
        }
        health = next;
    }
    health
}

/// Tree health after a contribution during the open day.
///
/// A contribution can only help: health rises halfway toward today's
/// adherence when that is higher, and otherwise stays put until rollover.
pub fn contributed_tree_health(current: i64, active_today: i64, member_count: i64) -> i64 {
    let current = current.clamp(MIN_TREE_HEALTH, MAX_TREE_HEALTH);
    current.max(next_tree_health(current, active_today, member_count))
}
