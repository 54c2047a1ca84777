//! # FocusFlow Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The session state machine and score → adjustment policy
//! - The score classifier (external judge with keyword fallback)
//! - The aggregation engine for user and group statistics
//! - Leaderboard ranking
//! - Port interfaces (traits) implemented by `focusflow-infra`
//!
//! ## Architecture Principles
//! - Only depends on `focusflow-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Time comes from an injected [`Clock`]

pub mod aggregation;
pub mod classification;
pub mod group;
pub mod leaderboard;
pub mod session;
pub mod user;
pub mod utils;

pub use aggregation::{
    AggregationEngine, AggregationOutcome, CommitOutcome, GroupContribution, HealthSweepReport,
    UserCredit,
};
pub use classification::{FocusJudge, KeywordClassifier, ScoreClassifier};
pub use group::{GroupRepository, GroupService};
pub use leaderboard::LeaderboardService;
pub use session::{
    AdjustmentPolicy, ReconcileReport, ScreenAnalysis, SessionCursor, SessionPage,
    SessionRepository, SessionService, StopOutcome,
};
pub use user::{UserRepository, UserService};
pub use utils::clock::{Clock, MockClock, SystemClock};
