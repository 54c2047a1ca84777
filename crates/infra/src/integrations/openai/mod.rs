//! OpenAI-compatible focus judge
//!
//! [`OpenAiJudge`] implements the core `FocusJudge` port on top of the Chat
//! Completions API. It sends the judge prompt built by the core and hands the
//! model's reply back untouched; the core parses it and falls back to the
//! keyword heuristic when anything goes wrong.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use focusflow_core::ScoreClassifier;
//! use focusflow_infra::http::HttpClient;
//! use focusflow_infra::integrations::openai::OpenAiJudge;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http_client = HttpClient::new()?;
//! let judge = OpenAiJudge::new(std::env::var("OPENAI_API_KEY")?, http_client);
//! let classifier = ScoreClassifier::with_judge(Arc::new(judge), Duration::from_secs(10));
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - **Network errors and 5xx**: retried by `HttpClient`
//! - **429**: retried by `HttpClient`, then reported as `RateLimit`
//! - **401/403**: `Authentication`, never retried
//! - Every failure reaches the core as `ClassificationUnavailable`

pub mod client;
pub mod types;

pub use client::OpenAiJudge;
pub use types::JudgeError;
