//! Routes driven in-process through the axum router.

mod support;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::json;
use support::TestApp;

const CODING: &str = "Writing Rust code in VSCode with a terminal open";

#[tokio::test(flavor = "multi_thread")]
async fn health_is_ok_on_a_fresh_database() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isHealthy"], true);
    assert_eq!(body["components"][0]["name"], "database");
}

#[tokio::test(flavor = "multi_thread")]
async fn identity_header_is_required_and_must_name_a_user() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let (status, _) = app.get("/users/me", "ghost").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn registration_creates_level_one_user() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;

    let (status, me) = app.get("/users/me", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["userId"], "alice");
    assert_eq!(me["displayName"], "Alice");
    assert_eq!(me["totalFocusMinutes"], 0);
    assert_eq!(me["level"], 1);
    assert_eq!(me["streakDays"], 0);

    let (status, body) = app
        .call(Method::POST, "/users", None, Some(json!({"userId": "alice", "displayName": "Again"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_bodies_are_invalid_input() {
    let app = TestApp::new();

    let (status, body) =
        app.call(Method::POST, "/users", None, Some(json!({"userId": "alice"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test(flavor = "multi_thread")]
async fn session_lifecycle_credits_minutes_once() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let id = app.start_session("alice", json!({"goal": "Thesis"})).await;

    let (status, analysis) = app
        .post(&format!("/sessions/{id}/analyze"), "alice", json!({"screenDescription": CODING}))
        .await;
    assert_eq!(status, StatusCode::OK, "{analysis}");
    assert_eq!(analysis["focusScore"], 90);
    assert_eq!(analysis["isProductive"], true);
    assert_eq!(analysis["adjustment"], 10);
    assert_eq!(analysis["totalAdjustment"], 10);
    assert_eq!(analysis["sessionStats"]["scoreCount"], 1);
    assert_eq!(analysis["sessionStats"]["averageFocusScore"], 90);

    app.clock.advance(Duration::minutes(30));
    let (status, outcome) = app.post(&format!("/sessions/{id}/stop"), "alice", json!({})).await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["minutesCredited"], 40);
    assert_eq!(outcome["statsSynced"], true);
    assert_eq!(outcome["newLevel"], 1);
    assert_eq!(outcome["session"]["status"], "completed");
    assert_eq!(outcome["session"]["durationSeconds"], 1800);

    let (status, again) = app.post(&format!("/sessions/{id}/stop"), "alice", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["error"], "invalid_state");

    let (_, me) = app.get("/users/me", "alice").await;
    assert_eq!(me["totalFocusMinutes"], 40);
    assert_eq!(me["streakDays"], 1);

    let (status, scores) = app.get(&format!("/sessions/{id}/scores"), "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scores.as_array().map(Vec::len), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn completed_sessions_reject_analysis_and_adjustment() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let id = app.start_session("alice", json!({})).await;
    app.post(&format!("/sessions/{id}/stop"), "alice", json!({})).await;

    let (status, _) = app
        .post(&format!("/sessions/{id}/analyze"), "alice", json!({"screenDescription": CODING}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&format!("/sessions/{id}/adjust"), "alice", json!({"adjustment": 5, "focusScore": 80}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_adjustments_accumulate() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let id = app.start_session("alice", json!({})).await;

    for (delta, expected) in [(10, 10), (-20, -10)] {
        let (status, body) = app
            .post(
                &format!("/sessions/{id}/adjust"),
                "alice",
                json!({"adjustment": delta, "focusScore": 55}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessionId"], id.as_str());
        assert_eq!(body["totalAdjustment"], expected);
    }

    let (_, session) = app.get(&format!("/sessions/{id}"), "alice").await;
    assert_eq!(session["focusAdjustment"], -10);
    assert_eq!(session["lastFocusScore"], 55);
    assert_eq!(session["scoreCount"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn sessions_are_private_to_their_owner() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    app.register("bob", "Bob").await;
    let id = app.start_session("alice", json!({})).await;

    let (status, body) = app.get(&format!("/sessions/{id}"), "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.post(&format!("/sessions/{id}/stop"), "bob", json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = uuid::Uuid::now_v7();
    let (status, _) = app.get(&format!("/sessions/{missing}"), "alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/sessions/not-a-uuid", "alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test(flavor = "multi_thread")]
async fn session_history_pages_newest_first() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(app.start_session("alice", json!({})).await);
        app.clock.advance(Duration::minutes(5));
    }

    let (status, page) = app.get("/sessions?limit=2", "alice").await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> =
        page["sessions"].as_array().unwrap().iter().map(|s| s["sessionId"].as_str().unwrap()).collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str()]);

    let before = page["nextBefore"]["startTime"].as_str().expect("cursor on a full page");
    let before_id = page["nextBefore"]["sessionId"].as_str().expect("cursor carries an id");
    let (_, rest) = app
        .get(&format!("/sessions?limit=2&before={before}&before_id={before_id}"), "alice")
        .await;
    assert_eq!(rest["sessions"].as_array().map(Vec::len), Some(1));
    assert_eq!(rest["sessions"][0]["sessionId"], ids[0].as_str());
    assert!(rest["nextBefore"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn history_cursor_walks_sessions_started_together() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(app.start_session("alice", json!({})).await);
    }

    let mut seen = Vec::new();
    let mut uri = "/sessions?limit=1".to_string();
    loop {
        let (status, page) = app.get(&uri, "alice").await;
        assert_eq!(status, StatusCode::OK, "{page}");
        for session in page["sessions"].as_array().unwrap() {
            seen.push(session["sessionId"].as_str().unwrap().to_string());
        }
        let cursor = &page["nextBefore"];
        if cursor.is_null() {
            break;
        }
        uri = format!(
            "/sessions?limit=1&before={}&before_id={}",
            cursor["startTime"].as_str().unwrap(),
            cursor["sessionId"].as_str().unwrap()
        );
    }

    ids.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(seen, ids);

    let missing = uuid::Uuid::now_v7();
    let (status, _) = app.get(&format!("/sessions?before_id={missing}"), "alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn group_sessions_feed_tree_health_and_leaderboards() {
    let app = TestApp::new();
    for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        app.register(id, name).await;
    }

    let (status, group) = app.post("/groups", "alice", json!({"name": "Library"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["memberCount"], 1);
    assert_eq!(group["dailyGoalMinutes"], 60);
    let group_id = group["groupId"].as_str().unwrap().to_string();

    let (status, joined) = app.post(&format!("/groups/{group_id}/join"), "bob", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["memberCount"], 2);
    let (status, _) = app.post(&format!("/groups/{group_id}/join"), "bob", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&format!("/groups/{group_id}"), "carol").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post("/sessions", "carol", json!({"groupId": group_id})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let id = app.start_session("alice", json!({"groupId": group_id})).await;
    app.clock.advance(Duration::minutes(30));
    app.post(&format!("/sessions/{id}/stop"), "alice", json!({})).await;

    let (_, group) = app.get(&format!("/groups/{group_id}"), "bob").await;
    assert_eq!(group["totalFocusMinutes"], 30);
    assert_eq!(group["treeHealth"], 100);

    let (_, members) = app.get(&format!("/groups/{group_id}/members"), "bob").await;
    assert_eq!(members[0]["userId"], "alice");
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["totalContributionMinutes"], 30);
    assert_eq!(members[1]["userId"], "bob");

    let (status, board) =
        app.get(&format!("/leaderboard?scope=group&group_id={group_id}"), "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["totalEntries"], 2);
    assert_eq!(board["entries"][0]["id"], "alice");
    assert_eq!(board["entries"][0]["metricValue"], 30);
    assert_eq!(board["entries"][1]["isCurrentUser"], true);
    assert_eq!(board["callerRank"], 2);

    let (status, _) =
        app.get(&format!("/leaderboard?scope=group&group_id={group_id}"), "carol").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, global) = app.get("/leaderboard", "carol").await;
    assert_eq!(global["scope"], "global");
    assert_eq!(global["totalEntries"], 3);
    assert_eq!(global["entries"][0]["id"], "alice");
    assert_eq!(global["callerRank"], 3);

    app.clock.advance(Duration::days(1));
    let refresh = format!("/admin/groups/{group_id}/refresh-health");
    let (status, _) = app.post(&refresh, "carol", json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only alice showed up yesterday: 100 moves halfway toward 50.
    let (status, refreshed) = app.post(&refresh, "alice", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["treeHealth"], 75);
    let (_, again) = app.post(&refresh, "bob", json!({})).await;
    assert_eq!(again["treeHealth"], 75);

    let missing = uuid::Uuid::now_v7();
    let (status, _) =
        app.post(&format!("/admin/groups/{missing}/refresh-health"), "alice", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn group_leaderboard_needs_a_group_id() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;

    let (status, body) = app.get("/leaderboard?scope=group", "alice").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test(flavor = "multi_thread")]
async fn reconcile_reports_an_empty_sweep() {
    let app = TestApp::new();
    app.register("alice", "Alice").await;
    let id = app.start_session("alice", json!({})).await;
    app.clock.advance(Duration::minutes(10));
    app.post(&format!("/sessions/{id}/stop"), "alice", json!({})).await;

    let (status, report) = app.post("/admin/reconcile?limit=10", "alice", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({"examined": 0, "applied": 0, "failed": 0}));
}
