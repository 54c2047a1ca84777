//! User registration and lookup

use std::sync::Arc;

use focusflow_domain::{FocusFlowError, Result, UserStats};
use tracing::info;

use super::ports::UserRepository;
use crate::utils::clock::Clock;

const MAX_USER_ID_LEN: usize = 128;
const MAX_DISPLAY_NAME_LEN: usize = 80;

/// Registration and lookup of users.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Service stamping new users with `clock`.
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Create a user with zero minutes at level 1.
    pub async fn register(&self, user_id: &str, display_name: &str) -> Result<UserStats> {
        let user_id = user_id.trim();
        let display_name = display_name.trim();

        if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
            return Err(FocusFlowError::InvalidInput(format!(
                "user id must be 1-{MAX_USER_ID_LEN} characters"
            )));
        }
        if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(FocusFlowError::InvalidInput(format!(
                "display name must be 1-{MAX_DISPLAY_NAME_LEN} characters"
            )));
        }

        let user = UserStats::new(user_id, display_name, self.clock.now());
        self.users.create_user(&user).await?;
        info!(user_id, "user registered");
        Ok(user)
    }

    /// Resolve a caller id to a known user, or fail with `Unauthenticated`.
    pub async fn authenticate(&self, user_id: &str) -> Result<UserStats> {
        if user_id.trim().is_empty() {
            return Err(FocusFlowError::Unauthenticated("missing caller identity".into()));
        }
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| FocusFlowError::Unauthenticated(format!("unknown user {user_id}")))
    }
}
