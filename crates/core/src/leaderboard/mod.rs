//! Leaderboard ranking

pub mod ranker;
pub mod service;

pub use ranker::{build_leaderboard, rank};
pub use service::LeaderboardService;
