//! Configuration structures
//!
//! Every section has a `Default` so partial TOML/JSON files only need to name
//! the values they override.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AGGREGATION_ATTEMPTS, DEFAULT_BONUS_MINUTES, DEFAULT_BONUS_THRESHOLD,
    DEFAULT_CLASSIFIER_TIMEOUT_MS, DEFAULT_PENALTY_MINUTES, DEFAULT_PENALTY_THRESHOLD,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file and pool settings
    pub database: DatabaseConfig,

    /// AI judge settings; the keyword heuristic needs none
    pub classifier: ClassifierConfig,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Score → minute adjustment thresholds
    pub policy: PolicyConfig,

    /// Retry budget for statistics rollups
    pub aggregation: AggregationConfig,
}

/// SQLite storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, created on first start
    pub path: String,

    /// Maximum pooled connections
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "focusflow.db".to_string(), pool_size: 8 }
    }
}

/// Settings for the AI-backed screen classifier.
///
/// When `enabled` is false, or no API key is configured, only the keyword
/// heuristic is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Whether to ask the AI judge before falling back to keywords
    pub enabled: bool,

    /// Chat-completions endpoint
    pub api_url: String,

    /// Bearer token for `api_url`
    pub api_key: Option<String>,

    /// Model name sent with every request
    pub model: String,

    /// Deadline for one judge call, after which the keyword result is used
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_ms: DEFAULT_CLASSIFIER_TIMEOUT_MS,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8080".to_string() }
    }
}

/// Score → minute adjustment thresholds.
///
/// `score >= bonus_threshold` earns `+bonus_minutes`; `score < penalty_threshold`
/// costs `penalty_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Lowest score that earns the bonus
    pub bonus_threshold: i64,

    /// Minutes added for a score at or above `bonus_threshold`
    pub bonus_minutes: i64,

    /// Scores below this cost the penalty
    pub penalty_threshold: i64,

    /// Minutes removed for a score below `penalty_threshold`
    pub penalty_minutes: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bonus_threshold: DEFAULT_BONUS_THRESHOLD,
            bonus_minutes: DEFAULT_BONUS_MINUTES,
            penalty_threshold: DEFAULT_PENALTY_THRESHOLD,
            penalty_minutes: DEFAULT_PENALTY_MINUTES,
        }
    }
}

/// Statistics rollup settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Total commit attempts (initial try + retries) per rollup.
    pub max_attempts: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_AGGREGATION_ATTEMPTS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"database": {"path": "/tmp/ff.db"}}"#).unwrap();

        assert_eq!(config.database.path, "/tmp/ff.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.policy, PolicyConfig::default());
        assert!(!config.classifier.enabled);
    }

    #[test]
    fn default_policy_matches_documented_thresholds() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.bonus_threshold, 70);
        assert_eq!(policy.bonus_minutes, 10);
        assert_eq!(policy.penalty_threshold, 40);
        assert_eq!(policy.penalty_minutes, 20);
    }
}
