//! Chat Completions client implementing the focus judge port

use async_trait::async_trait;
use focusflow_core::classification::{build_judge_prompt, FocusJudge};
use focusflow_domain::{ClassifierConfig, FocusFlowError, Result as DomainResult};
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use tracing::{debug, info};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, JudgeError};
use crate::http::HttpClient;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 1_000;
const TEMPERATURE: f32 = 0.3;
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const SYSTEM_PROMPT: &str =
    "You are a focus coach. You judge screen descriptions and answer with strict JSON.";

/// Focus judge backed by an OpenAI-compatible Chat Completions endpoint
pub struct OpenAiJudge {
    http_client: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiJudge {
    /// Judge using the default model and endpoint.
    pub fn new(api_key: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Build a judge from configuration.
    ///
    /// Returns `None` when the classifier is disabled or has no API key.
    pub fn from_config(
        config: &ClassifierConfig,
        http_client: HttpClient,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(
            Self::new(api_key, http_client)
                .with_model(&config.model)
                .with_api_url(&config.api_url),
        )
    }

    /// Use `model` instead of the default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send requests to `url` instead of the default endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Ask the model to judge one screen description.
    ///
    /// # Errors
    /// Returns `JudgeError` for transport failures, non-success statuses, or
    /// a body without a message.
    pub async fn request_judgement(&self, screen_description: &str) -> Result<String, JudgeError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: build_judge_prompt(screen_description) },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let request = self
            .http_client
            .request(Method::POST, &self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload);

        let response = self.http_client.send(request).await.map_err(|err| match err {
            FocusFlowError::Network(msg) | FocusFlowError::Internal(msg) => JudgeError::Network(msg),
            other => JudgeError::Network(other.to_string()),
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), model = %self.model, "received judge response");

        if !status.is_success() {
            return Err(error_for_status(status, response).await);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::InvalidSchema(format!("Failed to parse response: {e}")))?;

        if let Some(usage) = &body.usage {
            info!(tokens = usage.total_tokens, model = %self.model, "judge call complete");
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| JudgeError::InvalidSchema("Response contained no message".to_string()))
    }
}

#[async_trait]
impl FocusJudge for OpenAiJudge {
    async fn judge(&self, screen_description: &str) -> DomainResult<String> {
        Ok(self.request_judgement(screen_description).await?)
    }
}

async fn error_for_status(status: StatusCode, response: reqwest::Response) -> JudgeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            JudgeError::Authentication(format!("Invalid API key ({})", status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            JudgeError::RateLimit(retry_after)
        }
        _ => {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            JudgeError::Api { status: status.as_u16(), message }
        }
    }
}
