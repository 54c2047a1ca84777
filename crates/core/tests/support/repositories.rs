//! In-memory implementations of the core repository ports

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use focusflow_core::aggregation::{CommitOutcome, GroupContribution, UserCredit};
use focusflow_core::{GroupRepository, SessionCursor, SessionRepository, UserRepository};
use focusflow_domain::{
    average_score, FocusFlowError, FocusScoreRecord, FocusSession, GroupMember, GroupStats,
    LeaderboardEntry, Result as DomainResult, SessionScoreStats, SessionStatus, UserStats,
};
use uuid::Uuid;

#[derive(Default)]
struct State {
    sessions: HashMap<Uuid, FocusSession>,
    scores: Vec<FocusScoreRecord>,
    users: Vec<UserStats>,
    groups: HashMap<Uuid, GroupStats>,
    members: Vec<GroupMember>,
    user_ledger: HashSet<Uuid>,
    group_ledger: HashSet<Uuid>,
}

/// Single mutex-guarded store implementing every core port.
///
/// `inject_user_conflicts(n)` makes the next `n` user commits report a
/// version conflict without writing; `u32::MAX` means "always".
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    user_conflicts: AtomicU32,
    group_conflicts: AtomicU32,
    user_commit_calls: AtomicU32,
}

impl InMemoryStore {
    pub fn inject_user_conflicts(&self, count: u32) {
        self.user_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn inject_group_conflicts(&self, count: u32) {
        self.group_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn user_commit_calls(&self) -> u32 {
        self.user_commit_calls.load(Ordering::SeqCst)
    }

    pub fn user(&self, user_id: &str) -> Option<UserStats> {
        self.lock().users.iter().find(|u| u.user_id == user_id).cloned()
    }

    pub fn group(&self, group_id: Uuid) -> Option<GroupStats> {
        self.lock().groups.get(&group_id).cloned()
    }

    pub fn session(&self, session_id: Uuid) -> Option<FocusSession> {
        self.lock().sessions.get(&session_id).cloned()
    }

    pub fn score_count(&self) -> usize {
        self.lock().scores.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn take_injected(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn insert_session(&self, session: &FocusSession) -> DomainResult<()> {
        self.lock().sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> DomainResult<Option<FocusSession>> {
        Ok(self.lock().sessions.get(&session_id).cloned())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: usize,
        before: Option<SessionCursor>,
    ) -> DomainResult<Vec<FocusSession>> {
        let state = self.lock();
        let mut sessions: Vec<FocusSession> = state
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| before.map_or(true, |cursor| cursor.admits(s.start_time, s.session_id)))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.start_time.cmp(&a.start_time).then_with(|| b.session_id.cmp(&a.session_id))
        });
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn record_score(
        &self,
        record: &FocusScoreRecord,
    ) -> DomainResult<Option<SessionScoreStats>> {
        let mut state = self.lock();
        let Some(session) = state.sessions.get_mut(&record.session_id) else {
            return Ok(None);
        };
        if session.status != SessionStatus::Active {
            return Ok(None);
        }
        session.total_focus_score += record.focus_score;
        session.score_count += 1;
        session.average_focus_score =
            average_score(session.total_focus_score, session.score_count);
        session.last_focus_score = Some(record.focus_score);
        let stats = session.score_stats();
        state.scores.push(record.clone());
        Ok(Some(stats))
    }

    async fn apply_adjustment(
        &self,
        session_id: Uuid,
        delta: i64,
        focus_score: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<i64>> {
        let mut state = self.lock();
        match state.sessions.get_mut(&session_id) {
            Some(session) if session.status == SessionStatus::Active => {
                session.focus_adjustment += delta;
                session.last_focus_score = Some(focus_score);
                session.last_adjustment_at = Some(at);
                Ok(Some(session.focus_adjustment))
            }
            _ => Ok(None),
        }
    }

    async fn complete_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration_seconds: i64,
    ) -> DomainResult<Option<FocusSession>> {
        let mut state = self.lock();
        match state.sessions.get_mut(&session_id) {
            Some(session) if session.status == SessionStatus::Active => {
                session.status = SessionStatus::Completed;
                session.end_time = Some(end_time);
                session.duration_seconds = duration_seconds;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_stats_applied(&self, session_id: Uuid) -> DomainResult<()> {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.stats_applied = true;
        }
        Ok(())
    }

    async fn list_unapplied_sessions(&self, limit: usize) -> DomainResult<Vec<FocusSession>> {
        let state = self.lock();
        let mut sessions: Vec<FocusSession> = state
            .sessions
            .values()
            .filter(|s| s.status == SessionStatus::Completed && !s.stats_applied)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.end_time);
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn list_scores(&self, session_id: Uuid) -> DomainResult<Vec<FocusScoreRecord>> {
        Ok(self.lock().scores.iter().filter(|r| r.session_id == session_id).cloned().collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &UserStats) -> DomainResult<()> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.user_id == user.user_id) {
            return Err(FocusFlowError::InvalidInput(format!(
                "user {} already exists",
                user.user_id
            )));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> DomainResult<Option<UserStats>> {
        Ok(self.user(user_id))
    }

    async fn commit_user_credit(&self, credit: &UserCredit) -> DomainResult<CommitOutcome> {
        self.user_commit_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if state.user_ledger.contains(&credit.session_id) {
            return Ok(CommitOutcome::AlreadyApplied);
        }
        if Self::take_injected(&self.user_conflicts) {
            return Ok(CommitOutcome::Conflict);
        }
        let Some(user) = state.users.iter_mut().find(|u| u.user_id == credit.user_id) else {
            return Err(FocusFlowError::NotFound(format!("user {}", credit.user_id)));
        };
        if user.version != credit.expected_version {
            return Ok(CommitOutcome::Conflict);
        }
        user.total_focus_minutes = credit.total_focus_minutes;
        user.level = credit.level;
        user.streak_days = credit.streak_days;
        user.last_active_at = Some(credit.last_active_at);
        user.version += 1;
        state.user_ledger.insert(credit.session_id);
        Ok(CommitOutcome::Committed)
    }

    async fn list_user_entries(&self) -> DomainResult<Vec<LeaderboardEntry>> {
        Ok(self
            .lock()
            .users
            .iter()
            .map(|u| {
                LeaderboardEntry::new(&u.user_id, &u.display_name, u.total_focus_minutes, u.level)
            })
            .collect())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create_group(&self, group: &GroupStats, owner: &GroupMember) -> DomainResult<()> {
        let mut state = self.lock();
        state.groups.insert(group.group_id, group.clone());
        state.members.push(owner.clone());
        Ok(())
    }

    async fn find_group(&self, group_id: Uuid) -> DomainResult<Option<GroupStats>> {
        Ok(self.group(group_id))
    }

    async fn list_group_ids(&self) -> DomainResult<Vec<Uuid>> {
        let state = self.lock();
        let mut groups: Vec<&GroupStats> = state.groups.values().collect();
        groups.sort_by_key(|g| (g.created_at, g.group_id));
        Ok(groups.into_iter().map(|g| g.group_id).collect())
    }

    async fn find_member(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> DomainResult<Option<GroupMember>> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<GroupMember>> {
        Ok(self.lock().members.iter().filter(|m| m.group_id == group_id).cloned().collect())
    }

    async fn add_member(&self, member: &GroupMember) -> DomainResult<bool> {
        let mut state = self.lock();
        if state
            .members
            .iter()
            .any(|m| m.group_id == member.group_id && m.user_id == member.user_id)
        {
            return Ok(false);
        }
        let Some(group) = state.groups.get_mut(&member.group_id) else {
            return Err(FocusFlowError::NotFound(format!("group {}", member.group_id)));
        };
        group.member_count += 1;
        group.version += 1;
        state.members.push(member.clone());
        Ok(true)
    }

    async fn commit_group_contribution(
        &self,
        contribution: &GroupContribution,
    ) -> DomainResult<CommitOutcome> {
        let mut state = self.lock();
        if state.group_ledger.contains(&contribution.session_id) {
            return Ok(CommitOutcome::AlreadyApplied);
        }
        if Self::take_injected(&self.group_conflicts) {
            return Ok(CommitOutcome::Conflict);
        }
        let Some(group) = state.groups.get_mut(&contribution.group_id) else {
            return Err(FocusFlowError::NotFound(format!("group {}", contribution.group_id)));
        };
        if group.version != contribution.expected_version {
            return Ok(CommitOutcome::Conflict);
        }
        group.total_focus_minutes += contribution.minutes;
        group.tree_health = contribution.tree_health;
        group.health_day = contribution.health_day;
        group.last_active_at = Some(contribution.at);
        group.version += 1;

        if let Some(member) = state
            .members
            .iter_mut()
            .find(|m| m.group_id == contribution.group_id && m.user_id == contribution.user_id)
        {
            member.daily_contribution_minutes =
                member.daily_minutes_after(contribution.minutes, contribution.day);
            member.total_contribution_minutes += contribution.minutes;
            member.contribution_day = Some(contribution.day);
        }
        state.group_ledger.insert(contribution.session_id);
        Ok(CommitOutcome::Committed)
    }

    async fn commit_tree_health(
        &self,
        group_id: Uuid,
        expected_version: i64,
        tree_health: i64,
        health_day: NaiveDate,
    ) -> DomainResult<CommitOutcome> {
        let mut state = self.lock();
        match state.groups.get_mut(&group_id) {
            Some(group) if group.version == expected_version => {
                group.tree_health = tree_health;
                group.health_day = health_day;
                group.version += 1;
                Ok(CommitOutcome::Committed)
            }
            Some(_) => Ok(CommitOutcome::Conflict),
            None => Err(FocusFlowError::NotFound(format!("group {group_id}"))),
        }
    }

    async fn list_member_entries(&self, group_id: Uuid) -> DomainResult<Vec<LeaderboardEntry>> {
        let state = self.lock();
        Ok(state
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .filter_map(|m| state.users.iter().find(|u| u.user_id == m.user_id))
            .map(|u| {
                LeaderboardEntry::new(&u.user_id, &u.display_name, u.total_focus_minutes, u.level)
            })
            .collect())
    }
}
