//! Port interfaces for screen classification

use async_trait::async_trait;
use focusflow_domain::Result;

/// External model that judges how focused a screen looks.
///
/// Implementations return the model's raw text. Extracting a structured
/// result from that text is the core's job, so adapters stay thin and a
/// chatty model can never crash the pipeline.
#[async_trait]
pub trait FocusJudge: Send + Sync {
    /// Ask the model about `screen_description` and return its reply verbatim.
    ///
    /// Any failure should be reported as `ClassificationUnavailable`.
    async fn judge(&self, screen_description: &str) -> Result<String>;
}
