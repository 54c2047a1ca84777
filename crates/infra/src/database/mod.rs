//! Database implementations

mod columns;
pub mod group_repository;
pub mod manager;
pub mod session_repository;
pub mod user_repository;

pub use group_repository::*;
pub use manager::{DbManager, SqliteConnection};
pub use session_repository::*;
pub use user_repository::SqliteUserRepository;
