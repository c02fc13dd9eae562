/**
 * WebSocket Transport
 *
 * This module implements the `GET /ws` endpoint. It upgrades the request,
 * then pumps frames between the socket and a `Session`.
 *
 * # Handshake
 *
 * A bearer credential may ride on the upgrade request, either as an
 * `Authorization: Bearer …` header or a `?token=` query parameter. When one
 * is present it is verified before the upgrade and a bad credential is
 * refused with 401. Otherwise the client must send a `connect` frame within
 * the configured auth timeout.
 *
 * # Event Loop
 *
 * One task per connection selects over:
 * - inbound frames from the client
 * - events from the session's subscribed channels
 * - the auth deadline, while the connection is unauthenticated
 *
 * The session is closed (identity binding and subscriptions released) when
 * the loop ends, whichever side ended it.
 */
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap},
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::Instant;

use crate::backend::auth::bearer_token;
use crate::backend::error::ChatError;
use crate::backend::realtime::session::Session;
use crate::backend::server::state::AppState;
use crate::shared::{ErrorCode, ServerEvent};

/// Query parameters accepted on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - A credential was supplied and failed verification
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WsParams>,
) -> Result<Response, ChatError> {
    let header_token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);
    let credential = header_token.or(params.token);

    let deadline = Instant::now() + state.auth_timeout();
    let mut session = Session::new(state);
    let greeting = match credential {
        Some(token) => Some(session.authenticate(&token).await?),
        None => None,
    };

    tracing::debug!("[Realtime] Upgrading connection {}", session.connection().id());
    Ok(ws.on_upgrade(move |socket| run_session(socket, session, greeting, deadline)))
}

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) -> bool {
    let text = match event.to_text() {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("[Realtime] Failed to serialize event: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(text.into())).await.is_ok()
}

async fn send_close(sender: &mut SplitSink<WebSocket, Message>, reason: &'static str) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: reason.into(),
    };
    let _ = sender.send(Message::Close(Some(frame))).await;
}

/// Drive one upgraded connection until either side ends it
async fn run_session(socket: WebSocket, mut session: Session, greeting: Option<ServerEvent>, deadline: Instant) {
    let conn_id = session.connection().id();
    let (mut sender, mut receiver) = socket.split();
    tracing::info!("[Realtime] Connection {} opened", conn_id);

    if let Some(event) = greeting {
        if !send_event(&mut sender, &event).await {
            session.close();
            return;
        }
    }

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                let text = match inbound {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    // Binary frames are not part of the protocol; ping/pong is answered by axum
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!("[Realtime] Connection {} read error: {}", conn_id, e);
                        break;
                    }
                };

                let reply = session.handle_text(text.as_str()).await;
                let mut delivered = true;
                for event in &reply.events {
                    if !send_event(&mut sender, event).await {
                        delivered = false;
                        break;
                    }
                }
                if !delivered {
                    break;
                }
                if reply.close {
                    send_close(&mut sender, "unauthorized").await;
                    break;
                }
            }
            Some(event) = session.next_event(), if session.has_subscriptions() => {
                if !send_event(&mut sender, &event).await {
                    break;
                }
            }
            _ = tokio::time::sleep_until(deadline), if !session.is_authenticated() => {
                tracing::info!("[Realtime] Connection {} did not authenticate in time", conn_id);
                let timeout = ServerEvent::error(ErrorCode::Unauthorized, "authentication timed out");
                send_event(&mut sender, &timeout).await;
                send_close(&mut sender, "authentication timeout").await;
                break;
            }
        }
    }

    session.close();
    tracing::info!("[Realtime] Connection {} closed", conn_id);
}
