//! Score classifier - primary judge with keyword fallback

use std::sync::Arc;
use std::time::Duration;

use focusflow_domain::constants::DEFAULT_CLASSIFIER_TIMEOUT_MS;
use focusflow_domain::Classification;
use tracing::{debug, warn};

use super::fallback::KeywordClassifier;
use super::parser::parse_model_output;
use super::ports::FocusJudge;

/// Turns a screen description into a bounded [`Classification`].
///
/// The external judge is optional. Its failures, timeouts and unparseable
/// replies are logged and absorbed; callers always get a result.
pub struct ScoreClassifier {
    judge: Option<Arc<dyn FocusJudge>>,
    fallback: KeywordClassifier,
    timeout: Duration,
}

impl ScoreClassifier {
    /// Classifier that only uses the keyword heuristic.
    pub fn keyword_only() -> Self {
        Self {
            judge: None,
            fallback: KeywordClassifier,
            timeout: Duration::from_millis(DEFAULT_CLASSIFIER_TIMEOUT_MS),
        }
    }

    /// Classifier that asks `judge` first and falls back to keywords when it
    /// fails or exceeds `timeout`.
    pub fn with_judge(judge: Arc<dyn FocusJudge>, timeout: Duration) -> Self {
        Self { judge: Some(judge), fallback: KeywordClassifier, timeout }
    }

    /// Whether an AI judge is configured.
    pub fn has_judge(&self) -> bool {
        self.judge.is_some()
    }

    /// Classify `screen_description`. Never fails; judge errors and timeouts
    /// fall back to the keyword heuristic.
    pub async fn classify(&self, screen_description: &str) -> Classification {
        let Some(judge) = &self.judge else {
            return self.fallback.classify(screen_description);
        };

        match tokio::time::timeout(self.timeout, judge.judge(screen_description)).await {
            Ok(Ok(output)) => match parse_model_output(&output) {
                Some(classification) => {
                    debug!(focus_score = classification.focus_score, "judge classification parsed");
                    classification
                }
                None => {
                    warn!(
                        output_len = output.len(),
                        "judge reply had no parseable JSON, using keyword fallback"
                    );
                    self.fallback.classify(screen_description)
                }
            },
            Ok(Err(err)) => {
                warn!(error = %err, "focus judge failed, using keyword fallback");
                self.fallback.classify(screen_description)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "focus judge timed out, using keyword fallback"
                );
                self.fallback.classify(screen_description)
            }
        }
    }
}

impl Default for ScoreClassifier {
    fn default() -> Self {
        Self::keyword_only()
    }
}
