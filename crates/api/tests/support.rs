#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use focusflow_api::utils::auth::USER_ID_HEADER;
use focusflow_api::{router, AppContext};
use focusflow_core::MockClock;
use focusflow_domain::{Config, DatabaseConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router over a fresh SQLite file and a manually driven clock.
pub struct TestApp {
    pub router: Router,
    pub ctx: Arc<AppContext>,
    pub clock: MockClock,
    /// Keep temporary directory alive for the lifetime of the app.
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(mut config: Config) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temporary database directory");
        config.database = DatabaseConfig {
            path: temp_dir.path().join("focusflow.db").to_string_lossy().to_string(),
            pool_size: 4,
        };

        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).single().expect("valid start");
        let clock = MockClock::at(start);
        let ctx = Arc::new(
            AppContext::new_with_clock(config, Arc::new(clock.clone()))
                .expect("failed to build application context"),
        );

        Self { router: router(Arc::clone(&ctx)), ctx, clock, _temp_dir: temp_dir }
    }

    /// Send one request and decode the JSON response (Null for an empty body).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request builds");

        let response = self.router.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response is JSON")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn register(&self, user_id: &str, display_name: &str) {
        let (status, _) = self
            .call(
                Method::POST,
                "/users",
                None,
                Some(serde_json::json!({ "userId": user_id, "displayName": display_name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {user_id}");
    }

    /// Start a session and return its id.
    pub async fn start_session(&self, user: &str, body: Value) -> String {
        let (status, json) = self.post("/sessions", user, body).await;
        assert_eq!(status, StatusCode::CREATED, "start session: {json}");
        json["sessionId"].as_str().expect("session id").to_string()
    }
}
