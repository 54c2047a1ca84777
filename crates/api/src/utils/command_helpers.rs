//! Command execution helpers
//!
//! Every route handler runs its service call through [`execute_command`] so
//! timing, logging and the error → HTTP status mapping live in one place.

use std::future::Future;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use focusflow_domain::{FocusFlowError, Result as DomainResult};
use serde::Serialize;
use tracing::{error, warn};

use crate::utils::logging::{error_label, log_command_execution};

/// Error body returned by every failing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code such as `not_found`.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
}

/// A domain error on its way out of an HTTP handler.
#[derive(Debug)]
pub struct ApiError(pub FocusFlowError);

impl From<FocusFlowError> for ApiError {
    fn from(err: FocusFlowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, kind = error_label(&self.0), "request failed");
        }

        // Infrastructure detail stays in the logs.
        let message = match &self.0 {
            FocusFlowError::Database(_)
            | FocusFlowError::Config(_)
            | FocusFlowError::Network(_)
            | FocusFlowError::Internal(_)
            | FocusFlowError::ClassificationUnavailable(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody { error: error_label(&self.0), message };
        (status, Json(body)).into_response()
    }
}

/// Fixed HTTP status for each error kind.
pub fn status_for(error: &FocusFlowError) -> StatusCode {
    match error {
        FocusFlowError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        FocusFlowError::Forbidden(_) => StatusCode::FORBIDDEN,
        FocusFlowError::NotFound(_) => StatusCode::NOT_FOUND,
        FocusFlowError::InvalidState(_) => StatusCode::CONFLICT,
        FocusFlowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FocusFlowError::AggregationFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        FocusFlowError::ClassificationUnavailable(_)
        | FocusFlowError::Database(_)
        | FocusFlowError::Config(_)
        | FocusFlowError::Network(_)
        | FocusFlowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Time and log a command, converting its error for the HTTP boundary.
pub async fn execute_command<Fut, T>(command: &str, command_fut: Fut) -> Result<T, ApiError>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fut.await;

    log_command_execution(command, start.elapsed(), result.is_ok());
    if let Err(err) = &result {
        warn!(command, error_type = error_label(err), error = %err, "command returned error");
    }

    result.map_err(ApiError::from)
}

/// Unwrap a JSON body, reporting malformed input as `InvalidInput`.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| FocusFlowError::InvalidInput(rejection.body_text()).into())
}

/// Unwrap a path parameter, reporting malformed ids as `InvalidInput`.
pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| FocusFlowError::InvalidInput(rejection.body_text()).into())
}

/// Unwrap query parameters, reporting malformed values as `InvalidInput`.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| FocusFlowError::InvalidInput(rejection.body_text()).into())
}
