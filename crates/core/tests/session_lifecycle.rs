//! Session state machine and end-to-end crediting

mod support;

use chrono::Duration;
use focusflow_core::Clock;
use focusflow_domain::{Classification, FocusFlowError, SessionStatus};
use support::Harness;
use uuid::Uuid;

async fn harness_with_user(user_id: &str) -> Harness {
    let harness = Harness::new();
    harness.users.register(user_id, "Test User").await.unwrap();
    harness
}

#[tokio::test]
async fn start_requires_a_known_user() {
    let harness = Harness::new();

    let err = harness.sessions.start("ghost", None, None).await.unwrap_err();

    assert!(matches!(err, FocusFlowError::Unauthenticated(_)));
}

#[tokio::test]
async fn start_creates_active_session() {
    let harness = harness_with_user("alice").await;

    let session = harness.sessions.start("alice", None, Some("Write report".into())).await.unwrap();

    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.goal, "Write report");
    assert_eq!(session.start_time, harness.clock.now());
    assert!(harness.store.session(session.session_id).is_some());
}

#[tokio::test]
async fn end_to_end_credit_matches_duration_plus_adjustments() {
    let harness = harness_with_user("alice").await;
    let session = harness.sessions.start("alice", None, None).await.unwrap();
    let id = session.session_id;

    for score in [85, 30] {
        let classification = Classification::new(score, "observed", "General", score >= 50);
        harness.sessions.record_score(id, "alice", &classification, None).await.unwrap();
        let delta = harness.sessions.policy().delta_for(score);
        harness.sessions.adjust(id, "alice", delta, score).await.unwrap();
    }

    harness.clock.advance(Duration::seconds(1500));
    let outcome = harness.sessions.stop(id, "alice").await.unwrap();

    assert_eq!(outcome.minutes_credited, 15);
    assert_eq!(outcome.session.duration_seconds, 1500);
    assert_eq!(outcome.session.focus_adjustment, -10);
    assert_eq!(outcome.session.score_count, 2);
    assert_eq!(outcome.session.average_focus_score, 58);
    assert_eq!(outcome.new_level, Some(1));
    assert!(outcome.stats_synced);
    assert!(outcome.session.stats_applied);

    let user = harness.store.user("alice").unwrap();
    assert_eq!(user.total_focus_minutes, 15);
    assert_eq!(user.level, 1);
    assert_eq!(user.streak_days, 1);
}

#[tokio::test]
async fn large_penalty_credits_zero_minutes() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;

    harness.sessions.adjust(id, "alice", -1000, 10).await.unwrap();
    harness.clock.advance(Duration::minutes(5));
    let outcome = harness.sessions.stop(id, "alice").await.unwrap();

    assert_eq!(outcome.minutes_credited, 0);
    assert_eq!(harness.store.user("alice").unwrap().total_focus_minutes, 0);
}

#[tokio::test]
async fn second_stop_is_rejected_and_credits_once() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;
    harness.clock.advance(Duration::minutes(30));

    let first = harness.sessions.stop(id, "alice").await.unwrap();
    harness.clock.advance(Duration::minutes(30));
    let second = harness.sessions.stop(id, "alice").await;

    assert!(matches!(second, Err(FocusFlowError::InvalidState(_))));
    assert_eq!(first.minutes_credited, 30);

    let stored = harness.store.session(id).unwrap();
    assert_eq!(stored.duration_seconds, first.session.duration_seconds);
    assert_eq!(stored.end_time, first.session.end_time);
    assert_eq!(harness.store.user("alice").unwrap().total_focus_minutes, 30);
}

#[tokio::test]
async fn completed_sessions_reject_scores_and_adjustments() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;
    harness.sessions.stop(id, "alice").await.unwrap();

    let adjust = harness.sessions.adjust(id, "alice", 10, 80).await;
    let classification = Classification::new(80, "x", "General", true);
    let score = harness.sessions.record_score(id, "alice", &classification, None).await;
    let analyze = harness.sessions.analyze_screen(id, "alice", "coding in vscode", None).await;

    assert!(matches!(adjust, Err(FocusFlowError::InvalidState(_))));
    assert!(matches!(score, Err(FocusFlowError::InvalidState(_))));
    assert!(matches!(analyze, Err(FocusFlowError::InvalidState(_))));
    assert_eq!(harness.store.score_count(), 0);
}

#[tokio::test]
async fn other_users_are_forbidden() {
    let harness = harness_with_user("alice").await;
    harness.users.register("mallory", "Mallory").await.unwrap();
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;

    let stop = harness.sessions.stop(id, "mallory").await;
    let adjust = harness.sessions.adjust(id, "mallory", 10, 90).await;
    let get = harness.sessions.get_session(id, "mallory").await;

    assert!(matches!(stop, Err(FocusFlowError::Forbidden(_))));
    assert!(matches!(adjust, Err(FocusFlowError::Forbidden(_))));
    assert!(matches!(get, Err(FocusFlowError::Forbidden(_))));
    assert!(harness.store.session(id).unwrap().is_active());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let harness = harness_with_user("alice").await;

    let err = harness.sessions.stop(Uuid::now_v7(), "alice").await.unwrap_err();

    assert!(matches!(err, FocusFlowError::NotFound(_)));
}

#[tokio::test]
async fn analyze_screen_records_and_adjusts() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;

    let productive = harness
        .sessions
        .analyze_screen(id, "alice", "Coding in VSCode with the terminal", None)
        .await
        .unwrap();
    let distracted =
        harness.sessions.analyze_screen(id, "alice", "Watching YouTube", None).await.unwrap();

    assert!(productive.classification.is_productive);
    assert_eq!(productive.adjustment, 10);
    assert_eq!(productive.total_adjustment, 10);
    assert_eq!(distracted.adjustment, -20);
    assert_eq!(distracted.total_adjustment, -10);
    assert_eq!(distracted.session_stats.score_count, 2);
    assert_eq!(harness.store.score_count(), 2);
}

#[tokio::test]
async fn analyze_screen_requires_description() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;

    let err = harness.sessions.analyze_screen(id, "alice", "   ", None).await.unwrap_err();

    assert!(matches!(err, FocusFlowError::InvalidInput(_)));
}

#[tokio::test]
async fn score_records_keep_observation_time() {
    let harness = harness_with_user("alice").await;
    let id = harness.sessions.start("alice", None, None).await.unwrap().session_id;
    let observed = harness.clock.now() - Duration::seconds(30);
    harness.clock.advance(Duration::minutes(1));

    let classification = Classification::new(64, "reading docs", "Research", true);
    harness.sessions.record_score(id, "alice", &classification, Some(observed)).await.unwrap();

    let scores = harness.sessions.list_scores(id, "alice").await.unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].observed_at, observed);
    assert_eq!(scores[0].focus_score, 64);
}

#[tokio::test]
async fn history_pages_newest_first() {
    let harness = harness_with_user("alice").await;
    let mut started = Vec::new();
    for _ in 0..5 {
        let session = harness.sessions.start("alice", None, None).await.unwrap();
        started.push(session.session_id);
        harness.clock.advance(Duration::minutes(10));
    }

    let first = harness.sessions.list_sessions("alice", Some(2), None).await.unwrap();
    let ids: Vec<Uuid> = first.sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![started[4], started[3]]);
    assert!(first.next_before.is_some());

    let second = harness.sessions.list_sessions("alice", Some(2), first.next_before).await.unwrap();
    let ids: Vec<Uuid> = second.sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![started[2], started[1]]);

    let last = harness.sessions.list_sessions("alice", Some(2), second.next_before).await.unwrap();
    assert_eq!(last.sessions.len(), 1);
    assert!(last.next_before.is_none());
}

#[tokio::test]
async fn history_paging_keeps_sessions_sharing_a_start_time() {
    let harness = harness_with_user("alice").await;
    let mut started = Vec::new();
    for _ in 0..3 {
        started.push(harness.sessions.start("alice", None, None).await.unwrap().session_id);
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = harness.sessions.list_sessions("alice", Some(1), cursor).await.unwrap();
        seen.extend(page.sessions.iter().map(|s| s.session_id));
        match page.next_before {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    started.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(seen, started);
}

#[tokio::test]
async fn group_session_requires_membership() {
    let harness = harness_with_user("alice").await;
    harness.users.register("bob", "Bob").await.unwrap();
    let group = harness.groups.create_group("alice", "Study", None).await.unwrap();

    let outsider = harness.sessions.start("bob", Some(group.group_id), None).await;
    let missing = harness.sessions.start("alice", Some(Uuid::now_v7()), None).await;

    assert!(matches!(outsider, Err(FocusFlowError::Forbidden(_))));
    assert!(matches!(missing, Err(FocusFlowError::NotFound(_))));
}
