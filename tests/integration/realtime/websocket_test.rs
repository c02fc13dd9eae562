//! WebSocket transport tests
//!
//! These run the router on a real listener and connect with a WebSocket
//! client. They cover the upgrade refusal and the auth deadline.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::common::TEST_SECRET;
use xfchat::backend::routes::create_router;
use xfchat::backend::server::state::AppState;
use xfchat::backend::store::MemoryStore;
use xfchat::shared::{AppConfig, ErrorCode, ServerEvent};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve a fresh app on an ephemeral port
async fn serve(auth_timeout_secs: u64) -> (SocketAddr, AppState) {
    let config = AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .auth_timeout_secs(auth_timeout_secs)
        .build()
        .expect("test config");
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    let router = create_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });
    (addr, state)
}

fn refused_status(result: Result<impl Sized, WsError>) -> StatusCode {
    match result {
        Err(WsError::Http(response)) => response.status(),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("upgrade unexpectedly accepted"),
    }
}

async fn next_event(client: &mut Client) -> ServerEvent {
    let message = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("frame expected")
        .expect("stream open")
        .expect("read frame");
    match message {
        Message::Text(text) => serde_json::from_str(&text).expect("server event"),
        other => panic!("expected text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_header_credential_is_refused() {
    let (addr, _state) = serve(5).await;
    let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-token"));

    assert_eq!(refused_status(connect_async(request).await), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_query_credential_is_refused() {
    let (addr, state) = serve(5).await;
    let result = connect_async(format!("ws://{}/ws?token=garbage", addr)).await;

    assert_eq!(refused_status(result), StatusCode::UNAUTHORIZED);
    assert!(state.authenticator.registry().is_empty());
}

#[tokio::test]
async fn test_query_credential_greets_client() {
    let (addr, state) = serve(5).await;
    let token = state.verifier.issue_token("alice", 600).unwrap();
    let (mut client, _) = connect_async(format!("ws://{}/ws?token={}", addr, token))
        .await
        .expect("upgrade");

    assert_eq!(
        next_event(&mut client).await,
        ServerEvent::Connected {
            username: "alice".to_string()
        }
    );
    client.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();
    assert_eq!(next_event(&mut client).await, ServerEvent::Pong);
}

#[tokio::test]
async fn test_unauthenticated_connection_times_out() {
    let (addr, _state) = serve(1).await;
    let (mut client, _) = connect_async(format!("ws://{}/ws", addr)).await.expect("upgrade");

    // Frames before `connect` are dropped, not answered
    client.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();

    let event = next_event(&mut client).await;
    assert!(matches!(
        event,
        ServerEvent::Error { code: ErrorCode::Unauthorized, ref message } if message == "authentication timed out"
    ));

    let close = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("close expected")
        .expect("stream open")
        .expect("read frame");
    match close {
        Message::Close(Some(frame)) => assert_eq!(u16::from(frame.code), 1008),
        other => panic!("expected close frame, got {:?}", other),
    }
}
