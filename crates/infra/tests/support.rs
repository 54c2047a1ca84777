//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use focusflow_core::{
    AggregationEngine, Clock, GroupService, LeaderboardService, MockClock, SessionService,
    UserService,
};
use focusflow_infra::database::{
    DbManager, SqliteGroupRepository, SqliteSessionRepository, SqliteUserRepository,
};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Run a scalar query, for asserting on raw table state.
    pub fn query_i64(&self, sql: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(sql, [], |row| row.get(0)).expect("scalar query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Core services wired over the SQLite repositories and a mock clock.
pub struct SqliteHarness {
    pub db: TestDatabase,
    pub clock: MockClock,
    pub sessions_repo: Arc<SqliteSessionRepository>,
    pub users_repo: Arc<SqliteUserRepository>,
    pub groups_repo: Arc<SqliteGroupRepository>,
    pub users: UserService,
    pub groups: GroupService,
    pub sessions: SessionService,
    pub leaderboard: LeaderboardService,
    pub aggregation: Arc<AggregationEngine>,
}

impl SqliteHarness {
    pub fn new() -> Self {
        let db = TestDatabase::new();
        let clock = MockClock::default();
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let sessions_repo = Arc::new(SqliteSessionRepository::new(Arc::clone(&db.manager)));
        let users_repo = Arc::new(SqliteUserRepository::new(Arc::clone(&db.manager)));
        let groups_repo = Arc::new(SqliteGroupRepository::new(Arc::clone(&db.manager)));

        let aggregation = Arc::new(AggregationEngine::new(
            users_repo.clone(),
            groups_repo.clone(),
            shared_clock.clone(),
        ));
        let sessions = SessionService::new(
            sessions_repo.clone(),
            users_repo.clone(),
            groups_repo.clone(),
            aggregation.clone(),
            shared_clock.clone(),
        );

        Self {
            users: UserService::new(users_repo.clone(), shared_clock.clone()),
            groups: GroupService::new(groups_repo.clone(), users_repo.clone(), shared_clock.clone()),
            leaderboard: LeaderboardService::new(users_repo.clone(), groups_repo.clone()),
            sessions,
            aggregation,
            sessions_repo,
            users_repo,
            groups_repo,
            db,
            clock,
        }
    }
}
