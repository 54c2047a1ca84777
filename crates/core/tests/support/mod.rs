//! Shared test helpers for `focusflow-core` integration tests.
//!
//! The in-memory store honours the same contract as the SQLite adapter:
//! conditional writes on `status`/`version` and a credit ledger, so the
//! service tests exercise the real concurrency paths.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;

use focusflow_core::{
    AggregationEngine, Clock, GroupService, LeaderboardService, MockClock, SessionService,
    UserService,
};

pub use repositories::InMemoryStore;

/// Fully wired services over one in-memory store and a shared mock clock.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: MockClock,
    pub users: UserService,
    pub groups: GroupService,
    pub sessions: SessionService,
    pub leaderboard: LeaderboardService,
    pub aggregation: Arc<AggregationEngine>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::default()))
    }

    pub fn with_store(store: Arc<InMemoryStore>) -> Self {
        let clock = MockClock::default();
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let aggregation = Arc::new(AggregationEngine::new(
            store.clone(),
            store.clone(),
            shared_clock.clone(),
        ));
        let sessions = SessionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            aggregation.clone(),
            shared_clock.clone(),
        );

        Self {
            users: UserService::new(store.clone(), shared_clock.clone()),
            groups: GroupService::new(store.clone(), store.clone(), shared_clock.clone()),
            leaderboard: LeaderboardService::new(store.clone(), store.clone()),
            sessions,
            aggregation,
            store,
            clock,
        }
    }
}
