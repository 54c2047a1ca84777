//! Maintenance routes
//!
//! Both are safe to repeat: crediting is idempotent per session and a group
//! rolls over to a new day at most once.

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use focusflow_core::ReconcileReport;
use focusflow_domain::GroupStats;
use serde::Deserialize;
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::auth::Caller;
use crate::utils::command_helpers::{execute_command, path_param, query_params, ApiError};

/// Sessions examined per reconciliation when no limit is given.
pub const DEFAULT_RECONCILE_LIMIT: usize = 100;
const MAX_RECONCILE_LIMIT: usize = 1_000;

/// Query of `POST /admin/reconcile`.
#[derive(Debug, Deserialize)]
pub struct ReconcileQuery {
    /// Sessions to examine, capped at 1000.
    pub limit: Option<usize>,
}

/// `POST /admin/reconcile?limit=`
///
/// Re-run aggregation for completed sessions whose stats never landed.
pub async fn reconcile(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    query: Result<Query<ReconcileQuery>, QueryRejection>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let limit =
        query_params(query)?.limit.unwrap_or(DEFAULT_RECONCILE_LIMIT).clamp(1, MAX_RECONCILE_LIMIT);
    tracing::info!(requested_by = caller.id(), limit, "manual reconciliation requested");

    let report = execute_command("admin::reconcile", ctx.sessions.reconcile_pending(limit)).await?;
    Ok(Json(report))
}

/// `POST /admin/groups/{group_id}/refresh-health`
///
/// Members only. Closes the group's open day if a new UTC day has begun;
/// repeated calls on the same day return the group unchanged.
pub async fn refresh_group_health(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    group_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<GroupStats>, ApiError> {
    let group_id = path_param(group_id)?;
    tracing::info!(requested_by = caller.id(), %group_id, "group health refresh requested");

    let group = execute_command("admin::refresh_group_health", async {
        ctx.groups.get_group(caller.id(), group_id).await?;
        ctx.aggregation.refresh_group_health(group_id).await
    })
    .await?;
    Ok(Json(group))
}
