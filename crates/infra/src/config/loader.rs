//! Configuration loader
//!
//! Loads application configuration from a file and environment variables.
//!
//! ## Loading Strategy
//! 1. `FOCUSFLOW_CONFIG` names a file explicitly, otherwise standard paths are
//!    searched for; with no file at all, built-in defaults are used
//! 2. Environment variables are then applied on top, so a deployment can
//!    override single values without shipping a file
//! 3. JSON and TOML are supported, detected by extension
//!
//! ## Environment Variables
//! - `FOCUSFLOW_DB_PATH`: Database file path
//! - `FOCUSFLOW_DB_POOL_SIZE`: Connection pool size
//! - `FOCUSFLOW_BIND_ADDRESS`: HTTP listen address
//! - `FOCUSFLOW_CLASSIFIER_ENABLED`: Whether to call the external judge
//! - `FOCUSFLOW_CLASSIFIER_URL`: Chat-completions endpoint
//! - `FOCUSFLOW_CLASSIFIER_API_KEY`: Bearer token for the endpoint
//! - `FOCUSFLOW_CLASSIFIER_MODEL`: Model name
//! - `FOCUSFLOW_CLASSIFIER_TIMEOUT_MS`: Judge timeout in milliseconds
//! - `FOCUSFLOW_BONUS_THRESHOLD` / `FOCUSFLOW_BONUS_MINUTES`
//! - `FOCUSFLOW_PENALTY_THRESHOLD` / `FOCUSFLOW_PENALTY_MINUTES`
//! - `FOCUSFLOW_AGGREGATION_MAX_ATTEMPTS`: Rollup commit attempts
//!
//! ## File Locations
//! The loader searches, in order, the current directory, its two parents and
//! the executable's directory for `focusflow.{toml,json}` and
//! `config.{toml,json}`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use focusflow_domain::{Config, FocusFlowError, Result};

/// Load configuration: file (or defaults), then environment overrides.
///
/// # Errors
/// Returns `FocusFlowError::Config` if an explicitly named file is missing,
/// a file cannot be parsed, or an environment variable has an invalid value.
pub fn load() -> Result<Config> {
    let mut config = match std::env::var("FOCUSFLOW_CONFIG").ok() {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match find_config_file() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    tracing::info!(
        db_path = %config.database.path,
        bind_address = %config.server.bind_address,
        classifier_enabled = config.classifier.enabled,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from environment variables alone.
///
/// `FOCUSFLOW_DB_PATH` is required; everything else falls back to defaults.
///
/// # Errors
/// Returns `FocusFlowError::Config` if the database path is missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    env_var("FOCUSFLOW_DB_PATH")?;
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations.
///
/// # Errors
/// Returns `FocusFlowError::Config` if the file is missing, unreadable, or
/// not valid JSON/TOML.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FocusFlowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            FocusFlowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FocusFlowError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FocusFlowError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FocusFlowError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(FocusFlowError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["focusflow.toml", "focusflow.json", "config.toml", "config.json"];

    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter().flat_map(|dir| NAMES.iter().map(move |name| dir.join(name))).find(|p| p.exists())
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(path) = std::env::var("FOCUSFLOW_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_parse::<u32>("FOCUSFLOW_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }
    if let Ok(address) = std::env::var("FOCUSFLOW_BIND_ADDRESS") {
        config.server.bind_address = address;
    }

    config.classifier.enabled = env_bool("FOCUSFLOW_CLASSIFIER_ENABLED", config.classifier.enabled);
    if let Ok(url) = std::env::var("FOCUSFLOW_CLASSIFIER_URL") {
        config.classifier.api_url = url;
    }
    if let Ok(key) = std::env::var("FOCUSFLOW_CLASSIFIER_API_KEY") {
        config.classifier.api_key = Some(key).filter(|k| !k.trim().is_empty());
    }
    if let Ok(model) = std::env::var("FOCUSFLOW_CLASSIFIER_MODEL") {
        config.classifier.model = model;
    }
    if let Some(timeout) = env_parse::<u64>("FOCUSFLOW_CLASSIFIER_TIMEOUT_MS")? {
        config.classifier.timeout_ms = timeout;
    }

    if let Some(v) = env_parse::<i64>("FOCUSFLOW_BONUS_THRESHOLD")? {
        config.policy.bonus_threshold = v;
    }
    if let Some(v) = env_parse::<i64>("FOCUSFLOW_BONUS_MINUTES")? {
        config.policy.bonus_minutes = v;
    }
    if let Some(v) = env_parse::<i64>("FOCUSFLOW_PENALTY_THRESHOLD")? {
        config.policy.penalty_threshold = v;
    }
    if let Some(v) = env_parse::<i64>("FOCUSFLOW_PENALTY_MINUTES")? {
        config.policy.penalty_minutes = v;
    }
    if let Some(v) = env_parse::<u32>("FOCUSFLOW_AGGREGATION_MAX_ATTEMPTS")? {
        config.aggregation.max_attempts = v;
    }

    Ok(())
}

/// Get required environment variable
///
/// # Errors
/// Returns `FocusFlowError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        FocusFlowError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| FocusFlowError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
