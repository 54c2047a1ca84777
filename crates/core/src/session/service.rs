//! Session state machine
//!
//! `start` creates an active session; `record_score` and `adjust` mutate it
//! while active; `stop` is the single finalization point and hands the
//! credited minutes to the [`AggregationEngine`]. Completion and the stats
//! rollup are separate commits: a failed rollup never undoes a stop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use focusflow_domain::constants::{DEFAULT_SESSION_PAGE_SIZE, MAX_SESSION_PAGE_SIZE};
use focusflow_domain::{
    clamp_score, credited_minutes, Classification, FocusFlowError, FocusScoreRecord,
    FocusSession, Result, SessionScoreStats,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::policy::AdjustmentPolicy;
use super::ports::{SessionCursor, SessionRepository};
use crate::aggregation::{AggregationEngine, AggregationOutcome};
use crate::classification::ScoreClassifier;
use crate::group::ports::GroupRepository;
use crate::user::ports::UserRepository;
use crate::utils::clock::Clock;

const MAX_GOAL_LEN: usize = 200;
const MAX_SCREEN_DESCRIPTION_LEN: usize = 8_000;

/// Result of stopping a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOutcome {
    /// The completed session.
    pub session: FocusSession,
    /// Whole minutes plus adjustment, never negative.
    pub minutes_credited: i64,
    /// Level after the rollup; absent when the rollup did not land.
    pub new_level: Option<i64>,
    /// Lifetime minutes after the rollup; absent when it did not land.
    pub new_total_minutes: Option<i64>,
    /// False when stats are still pending reconciliation.
    pub stats_synced: bool,
}

/// Result of classifying a screen and applying the policy adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenAnalysis {
    /// What the classifier decided.
    #[serde(flatten)]
    pub classification: Classification,
    /// Minutes this score added or removed.
    pub adjustment: i64,
    /// Session adjustment after this score.
    pub total_adjustment: i64,
    /// Running score totals after this score.
    pub session_stats: SessionScoreStats,
}

/// One page of a user's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    /// Sessions on this page.
    pub sessions: Vec<FocusSession>,
    /// Pass back as `before` to fetch the next page; absent on the last page.
    pub next_before: Option<SessionCursor>,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Completed sessions whose stats were pending.
    pub examined: usize,
    /// Sessions rolled up in this pass.
    pub applied: usize,
    /// Sessions still pending.
    pub failed: usize,
}

/// Focus session service
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    classifier: Arc<ScoreClassifier>,
    aggregation: Arc<AggregationEngine>,
    policy: AdjustmentPolicy,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    /// Service with the keyword classifier and the default policy.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        aggregation: Arc<AggregationEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            users,
            groups,
            classifier: Arc::new(ScoreClassifier::keyword_only()),
            aggregation,
            policy: AdjustmentPolicy::default(),
            clock,
        }
    }

    /// Use `classifier` for screen analysis.
    pub fn with_classifier(mut self, classifier: Arc<ScoreClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use `policy` for minute adjustments.
    pub fn with_policy(mut self, policy: AdjustmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Policy in effect.
    pub fn policy(&self) -> AdjustmentPolicy {
        self.policy
    }

    /// Start a new active session for `caller_id`.
    ///
    /// A `group_id` must name an existing group the caller belongs to.
    pub async fn start(
        &self,
        caller_id: &str,
        group_id: Option<Uuid>,
        goal: Option<String>,
    ) -> Result<FocusSession> {
        if self.users.find_user(caller_id).await?.is_none() {
            return Err(FocusFlowError::Unauthenticated(format!("unknown user {caller_id}")));
        }
        if goal.as_ref().is_some_and(|g| g.chars().count() > MAX_GOAL_LEN) {
            return Err(FocusFlowError::InvalidInput(format!(
                "goal must be at most {MAX_GOAL_LEN} characters"
            )));
        }
        if let Some(group_id) = group_id {
            if self.groups.find_group(group_id).await?.is_none() {
                return Err(FocusFlowError::NotFound(format!("group {group_id}")));
            }
            if self.groups.find_member(group_id, caller_id).await?.is_none() {
                return Err(FocusFlowError::Forbidden(format!(
                    "not a member of group {group_id}"
                )));
            }
        }

        let session = FocusSession::start(caller_id, group_id, goal, self.clock.now());
        self.sessions.insert_session(&session).await?;

        info!(
            session_id = %session.session_id,
            user_id = caller_id,
            group_id = ?group_id,
            "focus session started"
        );
        Ok(session)
    }

    /// Append a score record and update the running score statistics.
    ///
    /// Does not touch the time adjustment.
    pub async fn record_score(
        &self,
        session_id: Uuid,
        caller_id: &str,
        classification: &Classification,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<SessionScoreStats> {
        self.load_active(session_id, caller_id).await?;

        let now = self.clock.now();
        let record = FocusScoreRecord::new(
            session_id,
            caller_id,
            classification,
            observed_at.unwrap_or(now),
            now,
        );

        let stats = self
            .sessions
            .record_score(&record)
            .await?
            .ok_or_else(|| not_active(session_id))?;

        debug!(
            %session_id,
            focus_score = record.focus_score,
            score_count = stats.score_count,
            average_focus_score = stats.average_focus_score,
            "focus score recorded"
        );
        Ok(stats)
    }

    /// Add `delta` minutes to the session's adjustment; returns the new total.
    pub async fn adjust(
        &self,
        session_id: Uuid,
        caller_id: &str,
        delta: i64,
        focus_score: i64,
    ) -> Result<i64> {
        self.load_active(session_id, caller_id).await?;

        let total = self
            .sessions
            .apply_adjustment(session_id, delta, clamp_score(focus_score), self.clock.now())
            .await?
            .ok_or_else(|| not_active(session_id))?;

        debug!(%session_id, delta, total_adjustment = total, "session adjusted");
        Ok(total)
    }

    /// Classify a screen, record the score, then apply the policy delta.
    pub async fn analyze_screen(
        &self,
        session_id: Uuid,
        caller_id: &str,
        screen_description: &str,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<ScreenAnalysis> {
        let description = screen_description.trim();
        if description.is_empty() {
            return Err(FocusFlowError::InvalidInput("screen description is required".into()));
        }
        if description.len() > MAX_SCREEN_DESCRIPTION_LEN {
            return Err(FocusFlowError::InvalidInput(format!(
                "screen description must be at most {MAX_SCREEN_DESCRIPTION_LEN} bytes"
            )));
        }

        // Reject before paying for a model call.
        self.load_active(session_id, caller_id).await?;

        let classification = self.classifier.classify(description).await;
        let session_stats =
            self.record_score(session_id, caller_id, &classification, observed_at).await?;

        let adjustment = self.policy.delta_for(classification.focus_score);
        let total_adjustment =
            self.adjust(session_id, caller_id, adjustment, classification.focus_score).await?;

        Ok(ScreenAnalysis { classification, adjustment, total_adjustment, session_stats })
    }

    /// Complete the session and credit its minutes.
    ///
    /// Stopping twice fails with `InvalidState`; the first result stands.
    pub async fn stop(&self, session_id: Uuid, caller_id: &str) -> Result<StopOutcome> {
        let session = self.load_active(session_id, caller_id).await?;

        let now = self.clock.now();
        let duration_seconds = session.elapsed_seconds(now);
        let mut session = self
            .sessions
            .complete_session(session_id, now, duration_seconds)
            .await?
            .ok_or_else(|| not_active(session_id))?;

        let minutes = credited_minutes(session.duration_seconds, session.focus_adjustment);
        info!(
            %session_id,
            user_id = caller_id,
            duration_seconds,
            focus_adjustment = session.focus_adjustment,
            minutes_credited = minutes,
            "focus session completed"
        );

        let (new_level, new_total_minutes, stats_synced) =
            match self.apply_stats(&session, minutes).await {
                Some(outcome) => {
                    session.stats_applied = true;
                    (Some(outcome.new_level), Some(outcome.new_total_minutes), true)
                }
                None => (None, None, false),
            };

        Ok(StopOutcome {
            session,
            minutes_credited: minutes,
            new_level,
            new_total_minutes,
            stats_synced,
        })
    }

    /// Load a session owned by `caller_id`.
    pub async fn get_session(&self, session_id: Uuid, caller_id: &str) -> Result<FocusSession> {
        let session = self.load(session_id).await?;
        session.ensure_owned_by(caller_id)?;
        Ok(session)
    }

    /// Score records of a session owned by `caller_id`, oldest first.
    pub async fn list_scores(
        &self,
        session_id: Uuid,
        caller_id: &str,
    ) -> Result<Vec<FocusScoreRecord>> {
        self.get_session(session_id, caller_id).await?;
        self.sessions.list_scores(session_id).await
    }

    /// The caller's sessions, newest first.
    pub async fn list_sessions(
        &self,
        caller_id: &str,
        limit: Option<usize>,
        before: Option<SessionCursor>,
    ) -> Result<SessionPage> {
        let limit = limit.unwrap_or(DEFAULT_SESSION_PAGE_SIZE).clamp(1, MAX_SESSION_PAGE_SIZE);

        let mut sessions =
            self.sessions.list_sessions_for_user(caller_id, limit + 1, before).await?;
        let next_before = if sessions.len() > limit {
            sessions.truncate(limit);
            sessions.last().map(SessionCursor::after)
        } else {
            None
        };

        Ok(SessionPage { sessions, next_before })
    }

    /// Re-run aggregation for completed sessions whose stats never landed.
    pub async fn reconcile_pending(&self, limit: usize) -> Result<ReconcileReport> {
        let pending = self.sessions.list_unapplied_sessions(limit).await?;
        let mut report = ReconcileReport { examined: pending.len(), ..ReconcileReport::default() };

        for session in &pending {
            let minutes = credited_minutes(session.duration_seconds, session.focus_adjustment);
            if self.apply_stats(session, minutes).await.is_some() {
                report.applied += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            examined = report.examined,
            applied = report.applied,
            failed = report.failed,
            "reconciliation sweep finished"
        );
        Ok(report)
    }

    /// Roll the session into stats and mark it applied. Failures are logged
    /// and reported as `None`.
    async fn apply_stats(
        &self,
        session: &FocusSession,
        minutes: i64,
    ) -> Option<AggregationOutcome> {
        let outcome = match self
            .aggregation
            .apply_completed_session(&session.user_id, session.session_id, minutes, session.group_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    session_id = %session.session_id,
                    user_id = %session.user_id,
                    error = %err,
                    "stats rollup failed, session left for reconciliation"
                );
                return None;
            }
        };

        if let Err(err) = self.sessions.mark_stats_applied(session.session_id).await {
            // The credit ledger keeps a later sweep from counting it twice.
            warn!(session_id = %session.session_id, error = %err, "failed to mark stats applied");
        }
        Some(outcome)
    }

    async fn load(&self, session_id: Uuid) -> Result<FocusSession> {
        self.sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| FocusFlowError::NotFound(format!("session {session_id}")))
    }

    async fn load_active(&self, session_id: Uuid, caller_id: &str) -> Result<FocusSession> {
        let session = self.load(session_id).await?;
        session.ensure_owned_by(caller_id)?;
        session.ensure_active()?;
        Ok(session)
    }
}

fn not_active(session_id: Uuid) -> FocusFlowError {
    FocusFlowError::InvalidState(format!("session {session_id} is no longer active"))
}
