//! Session integration tests

use assert_matches::assert_matches;
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

use crate::common::TestApp;
use xfchat::backend::realtime::{Channel, Session};
use xfchat::shared::{ErrorCode, ServerEvent};

async fn connect(app: &TestApp, username: &str) -> Session {
    let mut session = Session::new(app.state.clone());
    let frame = json!({ "type": "connect", "token": app.token(username) }).to_string();
    let reply = session.handle_text(&frame).await;
    assert_matches!(reply.events.as_slice(), [ServerEvent::Connected { username: u }] if u == username);
    session
}

async fn next(session: &mut Session) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(1), session.next_event())
        .await
        .expect("event expected")
        .expect("open subscriptions")
}

async fn quiet(session: &mut Session) -> bool {
    tokio::time::timeout(Duration::from_millis(50), session.next_event())
        .await
        .is_err()
}

#[tokio::test]
async fn test_direct_message_flow() {
    let app = TestApp::new();
    let mut alice = connect(&app, "alice").await;
    let mut bob = connect(&app, "bob").await;

    let frame = json!({ "type": "direct_message", "receiver": "bob", "content": "hi" }).to_string();
    assert!(alice.handle_text(&frame).await.events.is_empty());
    assert!(quiet(&mut bob).await);

    app.befriend("alice", "bob").await;
    alice.handle_text(&frame).await;
    assert_matches!(next(&mut bob).await, ServerEvent::DirectMessage(m) if m.content == "hi");
    assert_matches!(next(&mut alice).await, ServerEvent::DirectMessage(m) if m.receiver == "bob");

    let (status, body) = app.get("/api/messages/history/alice", "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_content_reports_error() {
    let app = TestApp::new();
    let mut alice = connect(&app, "alice").await;
    let frame = json!({ "type": "direct_message", "receiver": "bob", "content": "" }).to_string();
    let reply = alice.handle_text(&frame).await;
    assert_matches!(
        reply.events.as_slice(),
        [ServerEvent::Error { code: ErrorCode::Invalid, .. }]
    );
}

#[tokio::test]
async fn test_group_fanout_and_kick() {
    let app = TestApp::new();
    let mut olga = connect(&app, "olga").await;
    let mut xena = connect(&app, "xena").await;
    let mut eve = connect(&app, "eve").await;
    let id = app.create_group("olga", "crew", &["xena"]).await;

    let subscribe = json!({ "type": "subscribe", "group_id": id }).to_string();
    assert!(olga.handle_text(&subscribe).await.events.is_empty());
    assert!(xena.handle_text(&subscribe).await.events.is_empty());
    assert_matches!(
        eve.handle_text(&subscribe).await.events.as_slice(),
        [ServerEvent::Error { code: ErrorCode::Forbidden, .. }]
    );

    let say = json!({ "type": "group_message", "group_id": id, "content": "hello" }).to_string();
    xena.handle_text(&say).await;
    assert_matches!(next(&mut olga).await, ServerEvent::GroupMessage(m) if m.sender == "xena");
    assert_matches!(next(&mut xena).await, ServerEvent::GroupMessage(m) if m.content == "hello");

    let (status, _) = app
        .post(&format!("/api/groups/{}/kick", id), "olga", json!({ "username": "xena" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_matches!(next(&mut xena).await, ServerEvent::GroupMessage(m) if m.is_system());
    assert!(!xena.is_subscribed(&Channel::Group(id)));
    assert_matches!(next(&mut olga).await, ServerEvent::GroupMessage(m) if m.is_system());
    assert!(olga.is_subscribed(&Channel::Group(id)));

    // The kicked member can no longer post
    xena.handle_text(&say).await;
    assert!(quiet(&mut olga).await);
}

#[tokio::test]
async fn test_unsubscribe_and_ping() {
    let app = TestApp::new();
    let mut olga = connect(&app, "olga").await;
    let id = app.create_group("olga", "crew", &[]).await;

    olga.handle_text(&json!({ "type": "subscribe", "group_id": id }).to_string()).await;
    assert!(olga.is_subscribed(&Channel::Group(id)));
    olga.handle_text(&json!({ "type": "unsubscribe", "group_id": id }).to_string()).await;
    assert!(!olga.is_subscribed(&Channel::Group(id)));

    let reply = olga.handle_text(r#"{"type":"ping"}"#).await;
    assert_eq!(reply.events, vec![ServerEvent::Pong]);
}

#[tokio::test]
async fn test_second_connect_is_rejected_without_closing() {
    let app = TestApp::new();
    let mut alice = connect(&app, "alice").await;
    let frame = json!({ "type": "connect", "token": app.token("mallory") }).to_string();

    let reply = alice.handle_text(&frame).await;
    assert!(!reply.close);
    assert_matches!(
        reply.events.as_slice(),
        [ServerEvent::Error { code: ErrorCode::Invalid, .. }]
    );
    assert_eq!(alice.identity().map(|i| i.as_str()), Some("alice"));
}

#[tokio::test]
async fn test_registry_tracks_open_sessions() {
    let app = TestApp::new();
    let first = connect(&app, "alice").await;
    let second = connect(&app, "alice").await;
    let registry = app.state.authenticator.registry().clone();
    assert_eq!(registry.connections_for("alice"), 2);

    drop(first);
    assert_eq!(registry.connections_for("alice"), 1);
    drop(second);
    assert!(registry.is_empty());
}
