//! Leaderboards

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Query, State};
use focusflow_domain::{Leaderboard, LeaderboardScope};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::auth::Caller;
use crate::utils::command_helpers::{execute_command, query_params, ApiError};

/// Query of `GET /leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Population to rank; global when absent.
    #[serde(default)]
    pub scope: LeaderboardScope,
    /// Required for the `group` scope.
    pub group_id: Option<Uuid>,
    /// Rows to return, capped at 100.
    pub limit: Option<usize>,
}

/// `GET /leaderboard?scope=global|group&group_id=&limit=`
pub async fn get_leaderboard(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Leaderboard>, ApiError> {
    let query = query_params(query)?;
    let board = execute_command(
        "leaderboard::get",
        ctx.leaderboard.leaderboard(caller.id(), query.scope, query.group_id, query.limit),
    )
    .await?;
    Ok(Json(board))
}
