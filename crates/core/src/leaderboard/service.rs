//! Leaderboard queries

use std::sync::Arc;

use focusflow_domain::constants::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT};
use focusflow_domain::{FocusFlowError, Leaderboard, LeaderboardScope, Result};
use tracing::debug;
use uuid::Uuid;

use super::ranker::build_leaderboard;
use crate::group::ports::GroupRepository;
use crate::user::ports::UserRepository;

/// Ranks users globally or within a group.
pub struct LeaderboardService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl LeaderboardService {
    /// Service reading from `users` and `groups`.
    pub fn new(users: Arc<dyn UserRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { users, groups }
    }

    /// Ranked view for `caller_id`.
    ///
    /// `limit` defaults to 50 and is capped at 100. The group scope needs a
    /// `group_id` the caller is a member of.
    pub async fn leaderboard(
        &self,
        caller_id: &str,
        scope: LeaderboardScope,
        group_id: Option<Uuid>,
        limit: Option<usize>,
    ) -> Result<Leaderboard> {
        let limit = effective_limit(limit);

        let entries = match scope {
            LeaderboardScope::Global => self.users.list_user_entries().await?,
            LeaderboardScope::Group => {
                let group_id = group_id.ok_or_else(|| {
                    FocusFlowError::InvalidInput("group leaderboard requires group_id".into())
                })?;
                if self.groups.find_group(group_id).await?.is_none() {
                    return Err(FocusFlowError::NotFound(format!("group {group_id}")));
                }
                if self.groups.find_member(group_id, caller_id).await?.is_none() {
                    return Err(FocusFlowError::Forbidden(format!(
                        "not a member of group {group_id}"
                    )));
                }
                self.groups.list_member_entries(group_id).await?
            }
        };

        let board = build_leaderboard(scope, entries, caller_id, limit);
        debug!(
            caller_id,
            %scope,
            total_entries = board.total_entries,
            caller_rank = ?board.caller_rank,
            "leaderboard built"
        );
        Ok(board)
    }
}

fn effective_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).clamp(1, MAX_LEADERBOARD_LIMIT)
}
