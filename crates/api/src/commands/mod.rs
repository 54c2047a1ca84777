//! HTTP route handlers
//!
//! Each module maps one area of the service onto axum handlers. Handlers
//! stay thin: extract, call the service through `execute_command`, wrap the
//! result in JSON.

pub mod admin;
pub mod groups;
pub mod health;
pub mod leaderboard;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::context::AppContext;

/// Build the application router over a shared context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .route("/users", post(users::register_user))
        .route("/users/me", get(users::get_me))
        .route("/groups", post(groups::create_group))
        .route("/groups/{group_id}", get(groups::get_group))
        .route("/groups/{group_id}/join", post(groups::join_group))
        .route("/groups/{group_id}/members", get(groups::list_members))
        .route("/sessions", post(sessions::start_session).get(sessions::list_sessions))
        .route("/sessions/{session_id}", get(sessions::get_session))
        .route("/sessions/{session_id}/scores", get(sessions::list_scores))
        .route("/sessions/{session_id}/analyze", post(sessions::analyze_screen))
        .route("/sessions/{session_id}/adjust", post(sessions::adjust_session))
        .route("/sessions/{session_id}/stop", post(sessions::stop_session))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/admin/reconcile", post(admin::reconcile))
        .route("/admin/groups/{group_id}/refresh-health", post(admin::refresh_group_health))
        .with_state(ctx)
}
