//! Friend graph and direct history integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;
use xfchat::shared::Identity;

#[tokio::test]
async fn test_friend_request_lifecycle() {
    let app = TestApp::new();
    app.users(&["alice", "bob"]).await;

    let (status, body) = app.post("/api/friends/request", "alice", json!({ "receiver": "bob" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["sender"], "alice");

    let (status, body) = app.post("/api/friends/request", "alice", json!({ "receiver": "bob" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate_pending");

    let (status, body) = app.get("/api/friends/requests", "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
    assert_eq!(body["requests"][0]["sender"], "alice");

    let (status, body) = app.post("/api/friends/accept", "bob", json!({ "sender": "alice" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (_, body) = app.get("/api/friends", "alice").await;
    assert_eq!(body["friends"], json!(["bob"]));
    let (_, body) = app.get("/api/friends", "bob").await;
    assert_eq!(body["friends"], json!(["alice"]));

    let (status, body) = app.post("/api/friends/accept", "bob", json!({ "sender": "alice" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "no_pending_request");

    let (status, body) = app.post("/api/friends/request", "bob", json!({ "receiver": "alice" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_friends");

    let (_, body) = app.get("/api/friends/requests", "bob").await;
    assert_eq!(body["requests"], json!([]));
}

#[tokio::test]
async fn test_friend_request_validation() {
    let app = TestApp::new();
    app.users(&["alice"]).await;

    let (status, body) = app.post("/api/friends/request", "alice", json!({ "receiver": "alice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "self_request");

    let (status, body) = app.post("/api/friends/request", "alice", json!({ "receiver": "nobody" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "user_not_found");
}

#[tokio::test]
async fn test_rejected_request_can_be_sent_again() {
    let app = TestApp::new();
    app.users(&["carol", "bob"]).await;

    app.post("/api/friends/request", "carol", json!({ "receiver": "bob" })).await;
    let (status, body) = app.post("/api/friends/reject", "bob", json!({ "sender": "carol" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (_, body) = app.get("/api/friends", "bob").await;
    assert_eq!(body["friends"], json!([]));

    let (status, body) = app.post("/api/friends/request", "carol", json!({ "receiver": "bob" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_only_receiver_can_accept() {
    let app = TestApp::new();
    app.users(&["alice", "bob"]).await;
    app.post("/api/friends/request", "alice", json!({ "receiver": "bob" })).await;

    let (status, _) = app.post("/api/friends/accept", "alice", json!({ "sender": "bob" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/friends", "alice").await;
    assert_eq!(body["friends"], json!([]));
}

#[tokio::test]
async fn test_remove_friend() {
    let app = TestApp::new();
    app.users(&["alice", "bob"]).await;
    app.befriend("alice", "bob").await;

    let (status, body) = app.delete("/api/friends/alice", "bob").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (_, body) = app.get("/api/friends", "alice").await;
    assert_eq!(body["friends"], json!([]));

    let (status, body) = app.delete("/api/friends/alice", "bob").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "not_friends");
}

#[tokio::test]
async fn test_direct_history_requires_friendship() {
    let app = TestApp::new();
    app.users(&["alice", "bob"]).await;

    let (status, body) = app.get("/api/messages/history/bob", "alice").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization_denied");

    app.befriend("alice", "bob").await;
    let messenger = &app.state.messenger;
    messenger
        .send_direct_message(&Identity::new("alice"), "bob", "first")
        .await
        .unwrap()
        .unwrap();
    messenger
        .send_direct_message(&Identity::new("bob"), "alice", "second")
        .await
        .unwrap()
        .unwrap();

    let (status, body) = app.get("/api/messages/history/alice", "bob").await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["first", "second"]);

    // History stays readable only while the friendship lasts
    app.delete("/api/friends/bob", "alice").await;
    let (status, _) = app.get("/api/messages/history/bob", "alice").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_recent_conversations() {
    let app = TestApp::new();
    app.users(&["alice", "bob", "carol"]).await;
    app.befriend("alice", "bob").await;
    app.befriend("alice", "carol").await;

    let alice = Identity::new("alice");
    let messenger = &app.state.messenger;
    messenger.send_direct_message(&alice, "bob", "hi bob").await.unwrap();
    messenger.send_direct_message(&alice, "carol", "hi carol").await.unwrap();
    messenger
        .send_direct_message(&Identity::new("bob"), "alice", "hey alice")
        .await
        .unwrap();

    let (status, body) = app.get("/api/messages/recent", "alice").await;
    assert_eq!(status, StatusCode::OK);
    let latest: Vec<&str> = body["conversations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(latest, vec!["hey alice", "hi carol"]);
}

#[tokio::test]
async fn test_non_friend_message_leaves_no_trace() {
    let app = TestApp::new();
    app.users(&["alice", "eve"]).await;

    let sent = app
        .state
        .messenger
        .send_direct_message(&Identity::new("eve"), "alice", "psst")
        .await
        .unwrap();
    assert!(sent.is_none());

    let (_, body) = app.get("/api/messages/recent", "alice").await;
    assert_eq!(body["conversations"], json!([]));
}
