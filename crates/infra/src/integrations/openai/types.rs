//! Chat Completions wire types and judge errors

use focusflow_domain::FocusFlowError;
use serde::{Deserialize, Serialize};

/// Failure talking to the judge endpoint
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Network-level error (connection failed, retries exhausted, etc.)
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit still in force after retries
    #[error("Rate limit exceeded (retry after {0}s)")]
    RateLimit(u64),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Response body doesn't match the Chat Completions shape
    #[error("Invalid response schema: {0}")]
    InvalidSchema(String),
}

impl From<JudgeError> for FocusFlowError {
    fn from(err: JudgeError) -> Self {
        FocusFlowError::ClassificationUnavailable(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    pub total_tokens: u32,
}
