//! Focus session lifecycle
//!
//! `start` → any number of `analyze` / `adjust` → `stop`. Every route but
//! `start` and the history list takes the session id from the path and
//! fails with 403 when the caller does not own it.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use focusflow_core::{ScreenAnalysis, SessionCursor, SessionPage, StopOutcome};
use focusflow_domain::{FocusFlowError, FocusScoreRecord, FocusSession};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::auth::Caller;
use crate::utils::command_helpers::{
    execute_command, json_body, path_param, query_params, ApiError,
};

/// Body of `POST /sessions`; may be empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Group to credit on completion; the caller must be a member.
    pub group_id: Option<Uuid>,
    /// Stated intention; a default goal is used when absent.
    pub goal: Option<String>,
}

/// Query of `GET /sessions`.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Page size, capped at 100.
    pub limit: Option<usize>,
    /// Only sessions that started before this instant, or at it with an id
    /// below `before_id`.
    pub before: Option<DateTime<Utc>>,
    /// Tie-break from the previous page's `nextBefore.sessionId`.
    pub before_id: Option<Uuid>,
}

impl ListSessionsQuery {
    fn cursor(&self) -> Result<Option<SessionCursor>, ApiError> {
        match (self.before, self.before_id) {
            (Some(start_time), session_id) => Ok(Some(SessionCursor { start_time, session_id })),
            (None, None) => Ok(None),
            (None, Some(_)) => Err(FocusFlowError::InvalidInput(
                "before_id requires before".to_string(),
            )
            .into()),
        }
    }
}

/// Body of `POST /sessions/{id}/analyze`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeScreenRequest {
    /// Text describing what is on screen.
    pub screen_description: String,
    /// When the screen was captured; defaults to the time of the request.
    pub observed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /sessions/{id}/adjust`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustSessionRequest {
    /// Signed minutes to add.
    pub adjustment: i64,
    /// Score that triggered the adjustment.
    pub focus_score: i64,
}

/// Response of `POST /sessions/{id}/adjust`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustSessionResponse {
    /// Session adjusted.
    pub session_id: Uuid,
    /// Session adjustment after this call.
    pub total_adjustment: i64,
}

/// `POST /sessions`
pub async fn start_session(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FocusSession>), ApiError> {
    let request = json_body(payload)?;
    let session = execute_command(
        "sessions::start",
        ctx.sessions.start(caller.id(), request.group_id, request.goal),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /sessions?limit=&before=&before_id=`
///
/// `nextBefore` in the response carries the `startTime` and `sessionId` to
/// pass back as `before` and `before_id`.
pub async fn list_sessions(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    query: Result<Query<ListSessionsQuery>, QueryRejection>,
) -> Result<Json<SessionPage>, ApiError> {
    let query = query_params(query)?;
    let cursor = query.cursor()?;
    let page = execute_command(
        "sessions::list",
        ctx.sessions.list_sessions(caller.id(), query.limit, cursor),
    )
    .await?;
    Ok(Json(page))
}

/// `GET /sessions/{session_id}`
pub async fn get_session(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<FocusSession>, ApiError> {
    let session_id = path_param(session_id)?;
    let session =
        execute_command("sessions::get", ctx.sessions.get_session(session_id, caller.id())).await?;
    Ok(Json(session))
}

/// `GET /sessions/{session_id}/scores`
pub async fn list_scores(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<FocusScoreRecord>>, ApiError> {
    let session_id = path_param(session_id)?;
    let scores =
        execute_command("sessions::list_scores", ctx.sessions.list_scores(session_id, caller.id()))
            .await?;
    Ok(Json(scores))
}

/// `POST /sessions/{session_id}/analyze`
///
/// Classify the described screen, record the score and apply the policy
/// adjustment in one call.
pub async fn analyze_screen(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    session_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AnalyzeScreenRequest>, JsonRejection>,
) -> Result<Json<ScreenAnalysis>, ApiError> {
    let session_id = path_param(session_id)?;
    let request = json_body(payload)?;
    let analysis = execute_command(
        "sessions::analyze_screen",
        ctx.sessions.analyze_screen(
            session_id,
            caller.id(),
            &request.screen_description,
            request.observed_at,
        ),
    )
    .await?;
    Ok(Json(analysis))
}

/// `POST /sessions/{session_id}/adjust`
///
/// For clients that apply their own policy: adds `adjustment` minutes
/// without recording a score.
pub async fn adjust_session(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    session_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AdjustSessionRequest>, JsonRejection>,
) -> Result<Json<AdjustSessionResponse>, ApiError> {
    let session_id = path_param(session_id)?;
    let request = json_body(payload)?;
    let total_adjustment = execute_command(
        "sessions::adjust",
        ctx.sessions.adjust(session_id, caller.id(), request.adjustment, request.focus_score),
    )
    .await?;
    Ok(Json(AdjustSessionResponse { session_id, total_adjustment }))
}

/// `POST /sessions/{session_id}/stop`
pub async fn stop_session(
    State(ctx): State<Arc<AppContext>>,
    caller: Caller,
    session_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<StopOutcome>, ApiError> {
    let session_id = path_param(session_id)?;
    let outcome =
        execute_command("sessions::stop", ctx.sessions.stop(session_id, caller.id())).await?;
    Ok(Json(outcome))
}
