//! Request plumbing shared by the route handlers

pub mod auth;
pub mod command_helpers;
pub mod health;
pub mod logging;
