//! Port interfaces for user statistics

use async_trait::async_trait;
use focusflow_domain::{LeaderboardEntry, Result, UserStats};

use crate::aggregation::ports::{CommitOutcome, UserCredit};

/// Storage for user statistics and the user credit ledger.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `InvalidInput` if the id is taken.
    async fn create_user(&self, user: &UserStats) -> Result<()>;

    async fn find_user(&self, user_id: &str) -> Result<Option<UserStats>>;

    /// Apply `credit` if the user is still at `credit.expected_version` and
    /// the session has not been credited before.
    async fn commit_user_credit(&self, credit: &UserCredit) -> Result<CommitOutcome>;

    /// Every user as a leaderboard row (metric = total focus minutes), in
    /// registration order.
    async fn list_user_entries(&self) -> Result<Vec<LeaderboardEntry>>;
}
