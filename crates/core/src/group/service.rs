//! Group creation and membership

use std::sync::Arc;

use focusflow_domain::constants::DEFAULT_DAILY_GOAL_MINUTES;
use focusflow_domain::{FocusFlowError, GroupMember, GroupStats, MemberRole, Result};
use tracing::info;
use uuid::Uuid;

use super::ports::GroupRepository;
use crate::user::ports::UserRepository;
use crate::utils::clock::Clock;

const MAX_GROUP_NAME_LEN: usize = 80;
const MAX_DAILY_GOAL_MINUTES: i64 = 24 * 60;

/// Group lifecycle and membership checks.
///
/// Every read is member-only; the counters that sessions feed are owned by
/// the [`AggregationEngine`](crate::aggregation::AggregationEngine).
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl GroupService {
    /// Service over the given stores and clock.
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { groups, users, clock }
    }

    /// Create a group owned by `caller_id`, who becomes its first member.
    pub async fn create_group(
        &self,
        caller_id: &str,
        name: &str,
        daily_goal_minutes: Option<i64>,
    ) -> Result<GroupStats> {
        self.require_user(caller_id).await?;

        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_GROUP_NAME_LEN {
            return Err(FocusFlowError::InvalidInput(format!(
                "group name must be 1-{MAX_GROUP_NAME_LEN} characters"
            )));
        }
        let goal = daily_goal_minutes.unwrap_or(DEFAULT_DAILY_GOAL_MINUTES);
        if !(1..=MAX_DAILY_GOAL_MINUTES).contains(&goal) {
            return Err(FocusFlowError::InvalidInput(format!(
                "daily goal must be between 1 and {MAX_DAILY_GOAL_MINUTES} minutes"
            )));
        }

        let now = self.clock.now();
        let group = GroupStats::new(name, caller_id, goal, now);
        let owner = GroupMember::new(group.group_id, caller_id, MemberRole::Owner, now);
        self.groups.create_group(&group, &owner).await?;

        info!(group_id = %group.group_id, owner_id = caller_id, "group created");
        Ok(group)
    }

    /// Add `caller_id` as a plain member. Joining twice is `InvalidInput`.
    pub async fn join_group(&self, caller_id: &str, group_id: Uuid) -> Result<GroupStats> {
        self.require_user(caller_id).await?;
        self.find_group(group_id).await?;

        let member = GroupMember::new(group_id, caller_id, MemberRole::Member, self.clock.now());
        if !self.groups.add_member(&member).await? {
            return Err(FocusFlowError::InvalidInput(format!(
                "already a member of group {group_id}"
            )));
        }

        info!(%group_id, user_id = caller_id, "member joined group");
        self.find_group(group_id).await
    }

    /// A group as seen by one of its members.
    pub async fn get_group(&self, caller_id: &str, group_id: Uuid) -> Result<GroupStats> {
        let group = self.find_group(group_id).await?;
        self.require_member(group_id, caller_id).await?;
        Ok(group)
    }

    /// Members in join order, for a caller who is one of them.
    pub async fn list_members(&self, caller_id: &str, group_id: Uuid) -> Result<Vec<GroupMember>> {
        self.find_group(group_id).await?;
        self.require_member(group_id, caller_id).await?;
        self.groups.list_members(group_id).await
    }

    /// Fail with `Forbidden` unless `user_id` belongs to the group.
    pub async fn require_member(&self, group_id: Uuid, user_id: &str) -> Result<GroupMember> {
        self.groups.find_member(group_id, user_id).await?.ok_or_else(|| {
            FocusFlowError::Forbidden(format!("not a member of group {group_id}"))
        })
    }

    /// Load a group or fail with `NotFound`, without a membership check.
    pub async fn find_group(&self, group_id: Uuid) -> Result<GroupStats> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| FocusFlowError::NotFound(format!("group {group_id}")))
    }

    async fn require_user(&self, user_id: &str) -> Result<()> {
        match self.users.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(FocusFlowError::Unauthenticated(format!("unknown user {user_id}"))),
        }
    }
}
