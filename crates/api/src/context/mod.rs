//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use focusflow_core::{
    AdjustmentPolicy, AggregationEngine, Clock, GroupRepository, GroupService, LeaderboardService,
    ScoreClassifier, SessionRepository, SessionService, SystemClock, UserRepository, UserService,
};
use focusflow_domain::{Config, Result};
use focusflow_infra::{
    DbManager, HttpClient, OpenAiJudge, SqliteGroupRepository, SqliteSessionRepository,
    SqliteUserRepository,
};
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Attempts per judge call, inside the classifier deadline.
const JUDGE_HTTP_ATTEMPTS: usize = 2;

/// Services shared by every request handler.
pub struct AppContext {
    /// Loaded configuration.
    pub config: Config,
    /// Shared connection pool.
    pub db: Arc<DbManager>,
    /// User registration.
    pub users: UserService,
    /// Groups and memberships.
    pub groups: GroupService,
    /// Session lifecycle.
    pub sessions: SessionService,
    /// Rankings.
    pub leaderboard: LeaderboardService,
    /// Statistics rollups and tree health.
    pub aggregation: Arc<AggregationEngine>,
    /// Screen classifier, also used by the health check.
    pub classifier: Arc<ScoreClassifier>,
}

impl AppContext {
    /// Open the configured database, apply migrations and wire the services
    /// against the system clock.
    pub fn new(config: Config) -> Result<Self> {
        Self::new_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`AppContext::new`] with an injected clock.
    pub fn new_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;
        Self::from_parts(config, db, clock)
    }

    /// Wire services over an already-migrated database.
    pub fn from_parts(config: Config, db: Arc<DbManager>, clock: Arc<dyn Clock>) -> Result<Self> {
        let session_repo: Arc<dyn SessionRepository> =
            Arc::new(SqliteSessionRepository::new(Arc::clone(&db)));
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(Arc::clone(&db)));
        let group_repo: Arc<dyn GroupRepository> =
            Arc::new(SqliteGroupRepository::new(Arc::clone(&db)));

        let classifier = Arc::new(build_classifier(&config)?);
        let aggregation = Arc::new(
            AggregationEngine::new(
                Arc::clone(&user_repo),
                Arc::clone(&group_repo),
                Arc::clone(&clock),
            )
            .with_max_attempts(config.aggregation.max_attempts),
        );

        let sessions = SessionService::new(
            session_repo,
            Arc::clone(&user_repo),
            Arc::clone(&group_repo),
            Arc::clone(&aggregation),
            Arc::clone(&clock),
        )
        .with_classifier(Arc::clone(&classifier))
        .with_policy(AdjustmentPolicy::new(config.policy));

        let users = UserService::new(Arc::clone(&user_repo), Arc::clone(&clock));
        let groups =
            GroupService::new(Arc::clone(&group_repo), Arc::clone(&user_repo), Arc::clone(&clock));
        let leaderboard = LeaderboardService::new(user_repo, group_repo);

        info!(
            db_path = %db.path().display(),
            ai_judge = classifier.has_judge(),
            max_attempts = config.aggregation.max_attempts,
            "application context initialised"
        );

        Ok(Self { config, db, users, groups, sessions, leaderboard, aggregation, classifier })
    }

    /// Check health of the service components.
    ///
    /// The database is checked with a query on a blocking thread; the
    /// classifier is always healthy since it falls back to keywords.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new()
            .add_component(self.check_database_health().await)
            .add_component(if self.classifier.has_judge() {
                ComponentHealth::healthy_with("classifier", "ai judge with keyword fallback")
            } else {
                ComponentHealth::healthy_with("classifier", "keyword fallback only")
            });

        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(e)) => {
                warn!(error = %e, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {e}"))
            }
            Err(e) => {
                tracing::error!(error = %e, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {e}"))
            }
        }
    }
}

/// The AI judge when configured, otherwise the keyword heuristic alone.
fn build_classifier(config: &Config) -> Result<ScoreClassifier> {
    let timeout = Duration::from_millis(config.classifier.timeout_ms);
    let http_client = HttpClient::builder()
        .timeout(timeout)
        .max_attempts(JUDGE_HTTP_ATTEMPTS)
        .user_agent(concat!("focusflow/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(match OpenAiJudge::from_config(&config.classifier, http_client) {
        Some(judge) => ScoreClassifier::with_judge(Arc::new(judge), timeout),
        None => {
            if config.classifier.enabled {
                warn!("classifier enabled without an API key; using keyword fallback only");
            }
            ScoreClassifier::keyword_only()
        }
    })
}
