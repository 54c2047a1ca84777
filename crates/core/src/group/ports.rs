//! Port interfaces for groups and their members

use async_trait::async_trait;
use chrono::NaiveDate;
use focusflow_domain::{GroupMember, GroupStats, LeaderboardEntry, Result};
use uuid::Uuid;

use crate::aggregation::ports::{CommitOutcome, GroupContribution};

/// Storage for study groups, their members and the group credit ledger.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a group together with its owner's membership.
    async fn create_group(&self, group: &GroupStats, owner: &GroupMember) -> Result<()>;

    async fn find_group(&self, group_id: Uuid) -> Result<Option<GroupStats>>;

    /// Every group id, oldest group first.
    async fn list_group_ids(&self) -> Result<Vec<Uuid>>;

    async fn find_member(&self, group_id: Uuid, user_id: &str) -> Result<Option<GroupMember>>;

    async fn list_members(&self, group_id: Uuid) -> Result<Vec<GroupMember>>;

    /// Add a member and increment `member_count` in one write.
    ///
    /// Returns `false` if the user was already a member.
    async fn add_member(&self, member: &GroupMember) -> Result<bool>;

    async fn commit_group_contribution(
        &self,
        contribution: &GroupContribution,
    ) -> Result<CommitOutcome>;

    /// Overwrite tree health and move the open day to `health_day` if the
    /// group is still at `expected_version`.
    async fn commit_tree_health(
        &self,
        group_id: Uuid,
        expected_version: i64,
        tree_health: i64,
        health_day: NaiveDate,
    ) -> Result<CommitOutcome>;

    /// The group's members as leaderboard rows (metric = each member's total
    /// focus minutes), in join order.
    async fn list_member_entries(&self, group_id: Uuid) -> Result<Vec<LeaderboardEntry>>;
}
