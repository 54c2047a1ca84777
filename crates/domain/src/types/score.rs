//! Focus score types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_FOCUS_SCORE, MIN_FOCUS_SCORE};

/// A single judgment about screen content.
///
/// Construct through [`Classification::new`] so the score is always clamped
/// to `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// 0 (distracted) to 100 (fully focused)
    pub focus_score: i64,
    /// Short human-readable reason
    pub explanation: String,
    /// Coarse activity label such as `coding`
    pub category: String,
    /// Whether the activity counts as work
    pub is_productive: bool,
}

impl Classification {
    /// Classification with the score clamped into range.
    pub fn new(
        focus_score: i64,
        explanation: impl Into<String>,
        category: impl Into<String>,
        is_productive: bool,
    ) -> Self {
        Self {
            focus_score: clamp_score(focus_score),
            explanation: explanation.into(),
            category: category.into(),
            is_productive,
        }
    }
}

/// Clamp `score` into `[0, 100]`.
pub fn clamp_score(score: i64) -> i64 {
    score.clamp(MIN_FOCUS_SCORE, MAX_FOCUS_SCORE)
}

/// Immutable, append-only record of one classification event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusScoreRecord {
    /// Record identifier
    pub score_id: Uuid,
    /// Session scored
    pub session_id: Uuid,
    /// Session owner
    pub user_id: String,
    /// Clamped score
    pub focus_score: i64,
    /// Reason given by the classifier
    pub explanation: String,
    /// Activity label
    pub category: String,
    /// Whether the activity counts as work
    pub is_productive: bool,
    /// When the screen was captured
    pub observed_at: DateTime<Utc>,
    /// When the record was stored
    pub created_at: DateTime<Utc>,
}

impl FocusScoreRecord {
    /// Record for `classification`, observed at `observed_at`.
    pub fn new(
        session_id: Uuid,
        user_id: impl Into<String>,
        classification: &Classification,
        observed_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            score_id: Uuid::now_v7(),
            session_id,
            user_id: user_id.into(),
            focus_score: clamp_score(classification.focus_score),
            explanation: classification.explanation.clone(),
            category: classification.category.clone(),
            is_productive: classification.is_productive,
            observed_at,
            created_at: now,
        }
    }
}
