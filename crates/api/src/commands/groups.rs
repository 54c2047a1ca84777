//! Study groups

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use focusflow_domain::{GroupMember, GroupStats};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::auth::Caller;
use crate::utils::command_helpers::{execute_command, json_body, path_param, ApiError};

/// Body of `POST /groups`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    /// Display name, non-blank.
    pub name: String,
    /// Defaults to 60 minutes.
    pub daily_goal_minutes: Option<i64>,
}

/// `POST /groups`
pub async fn create_group(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupStats>), ApiError> {
    let request = json_body(payload)?;
    let group = execute_command(
        "groups::create",
        ctx.groups.create_group(caller.id(), &request.name, request.daily_goal_minutes),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// `POST /groups/{group_id}/join`
pub async fn join_group(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    group_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<GroupStats>, ApiError> {
    let group_id = path_param(group_id)?;
    let group = execute_command("groups::join", ctx.groups.join_group(caller.id(), group_id)).await?;
    Ok(Json(group))
}

/// `GET /groups/{group_id}`
pub async fn get_group(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    group_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<GroupStats>, ApiError> {
    let group_id = path_param(group_id)?;
    let group = execute_command("groups::get", ctx.groups.get_group(caller.id(), group_id)).await?;
    Ok(Json(group))
}

/// `GET /groups/{group_id}/members`
pub async fn list_members(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    group_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<GroupMember>>, ApiError> {
    let group_id = path_param(group_id)?;
    let members =
        execute_command("groups::list_members", ctx.groups.list_members(caller.id(), group_id))
            .await?;
    Ok(Json(members))
}
