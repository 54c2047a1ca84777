//! # FocusFlow API
//!
//! axum HTTP boundary - routes and the application context.
//!
//! This crate contains:
//! - Route handlers (HTTP → service bridge)
//! - Caller identity extraction and error → status mapping
//! - Application context (dependency injection)
//! - The `focusflow` server binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::router;
pub use context::AppContext;
