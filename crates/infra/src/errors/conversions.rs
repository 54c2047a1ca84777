//! Conversions from external infrastructure errors into domain errors.

use focusflow_domain::FocusFlowError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FocusFlowError);

impl From<InfraError> for FocusFlowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FocusFlowError> for InfraError {
    fn from(value: FocusFlowError) -> Self {
        InfraError(value)
    }
}

/// Map a `spawn_blocking` join failure into the domain error.
pub fn map_join_error(err: tokio::task::JoinError) -> FocusFlowError {
    FocusFlowError::Internal(format!("Task join error: {err}"))
}

trait IntoFocusFlowError {
    fn into_focusflow(self) -> FocusFlowError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FocusFlowError */
/* -------------------------------------------------------------------------- */

impl IntoFocusFlowError for SqlError {
    fn into_focusflow(self) -> FocusFlowError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        FocusFlowError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        FocusFlowError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        FocusFlowError::InvalidInput("record already exists".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        FocusFlowError::NotFound("referenced record does not exist".into())
                    }
                    _ => FocusFlowError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FocusFlowError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                FocusFlowError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                FocusFlowError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                FocusFlowError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => FocusFlowError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => FocusFlowError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_focusflow())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → FocusFlowError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(FocusFlowError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FocusFlowError */
/* -------------------------------------------------------------------------- */

impl IntoFocusFlowError for HttpError {
    fn into_focusflow(self) -> FocusFlowError {
        if self.is_timeout() {
            return FocusFlowError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return FocusFlowError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                400..=499 if code != 429 => FocusFlowError::InvalidInput(message),
                _ => FocusFlowError::Network(message),
            };
        }

        FocusFlowError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_focusflow())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
