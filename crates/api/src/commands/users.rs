//! User registration and stats

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use focusflow_domain::UserStats;
use serde::Deserialize;

use crate::context::AppContext;
use crate::utils::auth::Caller;
use crate::utils::command_helpers::{execute_command, json_body, ApiError};

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Identity later sent in the `x-user-id` header.
    pub user_id: String,
    /// Name shown on leaderboards.
    pub display_name: String,
}

/// `POST /users`
///
/// Registration is the one write that needs no caller identity.
pub async fn register_user(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserStats>), ApiError> {
    let request = json_body(payload)?;
    let user = execute_command(
        "users::register",
        ctx.users.register(&request.user_id, &request.display_name),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/me`
pub async fn get_me(caller: Caller) -> Json<UserStats> {
    Json(caller.0)
}
