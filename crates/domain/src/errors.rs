//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FocusFlow
///
/// The first six variants form the caller-facing taxonomy. The remaining
/// variants describe infrastructure failures and surface as internal errors
/// at the transport boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FocusFlowError {
    /// Caller identity missing or unknown.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the referenced resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation is not legal in the resource's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External classifier failed or timed out. Never surfaced to callers;
    /// the score classifier recovers with the keyword heuristic.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// Statistics rollup could not be committed after bounded retries.
    /// `target` names what was being updated, e.g. `user alice`.
    #[error("Aggregation failed for {target}: {reason}")]
    AggregationFailed { target: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FocusFlowError {
    /// Stable, lowercase identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidInput(_) => "invalid_input",
            Self::ClassificationUnavailable(_) => "classification_unavailable",
            Self::AggregationFailed { .. } => "aggregation_failed",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for FocusFlow operations
pub type Result<T> = std::result::Result<T, FocusFlowError>;
