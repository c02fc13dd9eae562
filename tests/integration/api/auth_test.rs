//! Authentication integration tests
//!
//! Bearer handling of the REST surface and the public routes

use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use tower::ServiceExt;

use crate::common::TestApp;
use xfchat::backend::auth::{Claims, TokenVerifier};
use xfchat::backend::store::ChatStore;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/api/friends", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn test_api_rejects_foreign_signature() {
    let app = TestApp::new();
    let forged = TokenVerifier::new("some-other-secret", 0)
        .issue_token("alice", 600)
        .unwrap();

    let request = Request::builder()
        .uri("/api/friends")
        .header(AUTHORIZATION, format!("Bearer {}", forged))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_rejects_expired_token() {
    let app = TestApp::new();
    let claims = Claims {
        sub: "alice".to_string(),
        iat: 1_000,
        exp: 2_000,
    };
    let expired = app.state.verifier.sign(&claims).unwrap();

    let request = Request::builder()
        .uri("/api/groups")
        .header(AUTHORIZATION, format!("Bearer {}", expired))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_caller_is_recorded() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/friends", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["friends"], serde_json::json!([]));
    assert!(app.state.store.user_exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
