//! Caller identity extraction
//!
//! Identity arrives already resolved by the fronting proxy in the
//! `x-user-id` header; the handler only checks that it names a registered
//! user.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use focusflow_domain::{FocusFlowError, UserStats};

use crate::context::AppContext;
use crate::utils::command_helpers::ApiError;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub UserStats);

impl Caller {
    /// The caller's user id.
    pub fn id(&self) -> &str {
        &self.0.user_id
    }
}

impl FromRequestParts<Arc<AppContext>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                FocusFlowError::Unauthenticated(format!("missing {USER_ID_HEADER} header"))
            })?;

        let user = ctx.users.authenticate(user_id).await?;
        Ok(Self(user))
    }
}
