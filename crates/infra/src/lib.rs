//! # FocusFlow Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for sessions, users and groups (r2d2 pool)
//! - An HTTP client with bounded retries
//! - The OpenAI-compatible focus judge
//! - Configuration loading from files and environment
//!
//! ## Architecture
//! - Implements traits defined in `focusflow-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteGroupRepository, SqliteSessionRepository, SqliteUserRepository,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::openai::OpenAiJudge;
