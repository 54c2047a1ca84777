//! Liveness and database health

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;

use crate::context::AppContext;
use crate::utils::health::HealthStatus;

/// `GET /health`
///
/// Responds 200 when healthy and 503 when degraded, with the component
/// breakdown in both cases:
///
/// ```json
/// {
///   "isHealthy": true,
///   "score": 1.0,
///   "message": null,
///   "components": [
///     { "name": "database", "isHealthy": true, "message": null },
///     { "name": "classifier", "isHealthy": true, "message": "keyword fallback only" }
///   ],
///   "timestamp": 1698765432
/// }
/// ```
pub async fn get_health(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<HealthStatus>) {
    let status = ctx.health_check().await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
