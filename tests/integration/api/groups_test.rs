//! Group management integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;
use xfchat::shared::Identity;

fn contents(body: &serde_json::Value) -> Vec<String> {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_and_list_members() {
    let app = TestApp::new();
    app.users(&["olga", "pete", "quinn"]).await;

    let id = app.create_group("olga", "crew", &["pete", "quinn", "ghost"]).await;

    let (status, body) = app.get(&format!("/api/groups/{}/members", id), "pete").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], "olga");
    assert_eq!(body["members"], json!(["olga", "pete", "quinn"]));

    let (_, body) = app.get("/api/groups", "quinn").await;
    assert_eq!(body["groups"].as_array().unwrap().len(), 1);
    assert_eq!(body["groups"][0]["name"], "crew");
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/groups", "olga", json!({ "name": "   ", "member_usernames": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_group_reads_check_existence_then_membership() {
    let app = TestApp::new();
    app.users(&["olga", "eve"]).await;
    let id = app.create_group("olga", "crew", &[]).await;

    let (status, body) = app.get(&format!("/api/groups/{}/history", id), "eve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "authorization_denied");

    let (status, body) = app.get("/api/groups/9999/history", "eve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "group_not_found");

    let (status, _) = app.get(&format!("/api/groups/{}/members", id), "eve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_kick_and_history() {
    let app = TestApp::new();
    app.users(&["olga", "xena", "yuri"]).await;
    let id = app.create_group("olga", "crew", &["xena", "yuri"]).await;

    app.state
        .messenger
        .send_group_message(&Identity::new("xena"), id, "hello all")
        .await
        .unwrap()
        .unwrap();

    let (status, body) = app
        .post(&format!("/api/groups/{}/kick", id), "yuri", json!({ "username": "xena" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "not_owner");

    let (status, body) = app
        .post(&format!("/api/groups/{}/kick", id), "olga", json!({ "username": "olga" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "cannot_kick_owner");

    let (status, body) = app
        .post(&format!("/api/groups/{}/kick", id), "olga", json!({ "username": "xena" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"]["members"], json!(["olga", "yuri"]));
    assert_eq!(body["notice"]["sender"], "SYSTEM");

    let (status, body) = app.get(&format!("/api/groups/{}/history", id), "yuri").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        contents(&body),
        vec![
            "hello all".to_string(),
            "xena has been removed from the group by the owner.".to_string()
        ]
    );

    let (status, _) = app.get(&format!("/api/groups/{}/history", id), "xena").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_leave_transfers_ownership() {
    let app = TestApp::new();
    app.users(&["mallory", "bob", "carol"]).await;
    let id = app.create_group("mallory", "crew", &["carol", "bob"]).await;

    let (status, body) = app.post(&format!("/api/groups/{}/leave", id), "mallory", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"]["owner"], "bob");
    assert_eq!(
        body["notice"]["content"],
        "mallory has left the group. Ownership transferred to: bob"
    );

    let (status, body) = app.post(&format!("/api/groups/{}/leave", id), "mallory", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "not_a_member");
}

#[tokio::test]
async fn test_last_member_leaving_deletes_group() {
    let app = TestApp::new();
    app.users(&["solo"]).await;
    let id = app.create_group("solo", "alone", &[]).await;

    let (status, body) = app.post(&format!("/api/groups/{}/leave", id), "solo", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());
    assert!(body["notice"].is_null());

    let (status, body) = app.get(&format!("/api/groups/{}/members", id), "solo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "group_not_found");
}

#[tokio::test]
async fn test_transfer_then_rename_requires_new_owner() {
    let app = TestApp::new();
    app.users(&["olga", "pete"]).await;
    let id = app.create_group("olga", "crew", &["pete"]).await;

    let (status, body) = app
        .put(&format!("/api/groups/{}/owner", id), "olga", json!({ "username": "nobody" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "not_a_member");

    let (status, body) = app
        .put(&format!("/api/groups/{}/owner", id), "olga", json!({ "username": "pete" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"]["owner"], "pete");
    assert_eq!(body["notice"]["content"], "Ownership transferred to: pete");

    let (status, body) = app
        .put(&format!("/api/groups/{}/name", id), "olga", json!({ "name": "mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "not_owner");

    let (status, body) = app
        .put(&format!("/api/groups/{}/name", id), "pete", json!({ "name": "petes" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"]["name"], "petes");
    assert_eq!(body["notice"]["content"], "Group name changed to: petes");
}

#[tokio::test]
async fn test_delete_group() {
    let app = TestApp::new();
    app.users(&["olga", "pete"]).await;
    let id = app.create_group("olga", "crew", &["pete"]).await;

    let (status, _) = app.delete(&format!("/api/groups/{}", id), "pete").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&format!("/api/groups/{}", id), "olga").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["content"], "Group has been deleted by the owner.");

    let (status, _) = app.get(&format!("/api/groups/{}/history", id), "olga").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/api/groups", "pete").await;
    assert_eq!(body["groups"], json!([]));
}
