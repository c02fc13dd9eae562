//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests:
//! - An in-memory `AppState` and the router built from it
//! - Token helpers
//! - A `oneshot` request helper returning status and JSON body

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use xfchat::backend::routes::create_router;
use xfchat::backend::server::state::AppState;
use xfchat::backend::store::{ChatStore, MemoryStore};
use xfchat::shared::AppConfig;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Application under test, backed by the in-memory store
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::builder()
            .jwt_secret(TEST_SECRET)
            .build()
            .expect("test config");
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Bearer token for `username`, valid for ten minutes
    pub fn token(&self, username: &str) -> String {
        self.state
            .verifier
            .issue_token(username, 600)
            .expect("token")
    }

    /// Register `usernames` in the user directory
    pub async fn users(&self, usernames: &[&str]) {
        for username in usernames {
            self.state.store.ensure_user(username).await.expect("ensure user");
        }
    }

    /// Send one request and return the status and parsed JSON body
    ///
    /// The body is `Value::Null` when the response has none.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(AUTHORIZATION, auth_header(&self.token(user)));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Make `a` and `b` friends through the REST surface
    pub async fn befriend(&self, a: &str, b: &str) {
        let (status, _) = self
            .post("/api/friends/request", a, serde_json::json!({ "receiver": b }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = self
            .post("/api/friends/accept", b, serde_json::json!({ "sender": a }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Create a group through the REST surface and return its id
    pub async fn create_group(&self, owner: &str, name: &str, members: &[&str]) -> i64 {
        let (status, body) = self
            .post(
                "/api/groups",
                owner,
                serde_json::json!({ "name": name, "member_usernames": members }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create group: {}", body);
        body["id"].as_i64().expect("group id")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
