//! Score → minute adjustment policy

use focusflow_domain::{clamp_score, PolicyConfig};

/// Maps an observed focus score to a signed minute delta.
///
/// Kept apart from the session state machine so thresholds can change
/// without touching transition logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentPolicy {
    config: PolicyConfig,
}

impl AdjustmentPolicy {
    /// Policy with the given thresholds.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// `+bonus` at or above the bonus threshold, `-penalty` strictly below the
    /// penalty threshold, otherwise zero.
    pub fn delta_for(&self, focus_score: i64) -> i64 {
        let score = clamp_score(focus_score);
        if score >= self.config.bonus_threshold {
            self.config.bonus_minutes
        } else if score < self.config.penalty_threshold {
            -self.config.penalty_minutes
        } else {
            0
        }
    }
}
