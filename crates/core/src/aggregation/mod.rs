//! Statistics rollup for completed sessions

pub mod ports;
pub mod service;

pub use ports::{CommitOutcome, GroupContribution, UserCredit};
pub use service::{AggregationEngine, AggregationOutcome, HealthSweepReport};
