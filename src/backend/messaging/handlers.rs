//! Messaging HTTP Handlers
//!
//! This module contains the HTTP handlers for friend requests, friendships
//! and direct message history. Every handler runs behind `auth_middleware`
//! and acts as the authenticated caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::backend::authorization::AuthorizationGate;
use crate::backend::error::ChatResult;
use crate::backend::middleware::AuthUser;
use crate::backend::social::SocialGraph;
use crate::backend::store::ChatStore;
use crate::shared::messaging::{
    DirectHistoryResponse, FriendRequest, ListFriendRequestsResponse, ListFriendsResponse,
    RecentConversationsResponse, RespondFriendRequestRequest, SendFriendRequestRequest,
};

/// Send a friend request (POST /api/friends/request)
///
/// # Errors
///
/// * `400 Bad Request` - Request addressed to the caller
/// * `404 Not Found` - Receiver is unknown
/// * `409 Conflict` - Already friends, or a request is already pending
pub async fn send_friend_request(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
    Json(request): Json<SendFriendRequestRequest>,
) -> ChatResult<(StatusCode, Json<FriendRequest>)> {
    let created = social.send_friend_request(user.identity(), &request.receiver).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Accept a pending request sent to the caller (POST /api/friends/accept)
///
/// # Errors
///
/// * `404 Not Found` - No pending request from `sender`
pub async fn accept_friend_request(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
    Json(request): Json<RespondFriendRequestRequest>,
) -> ChatResult<Json<FriendRequest>> {
    let accepted = social.accept_friend_request(user.identity(), &request.sender).await?;
    Ok(Json(accepted))
}

/// Reject a pending request sent to the caller (POST /api/friends/reject)
pub async fn reject_friend_request(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
    Json(request): Json<RespondFriendRequestRequest>,
) -> ChatResult<Json<FriendRequest>> {
    let rejected = social.reject_friend_request(user.identity(), &request.sender).await?;
    Ok(Json(rejected))
}

/// Remove a friendship (DELETE /api/friends/{username})
///
/// # Errors
///
/// * `409 Conflict` - The users are not friends
pub async fn remove_friend(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> ChatResult<StatusCode> {
    social.remove_friend(user.identity(), &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's friends (GET /api/friends)
pub async fn list_friends(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
) -> ChatResult<Json<ListFriendsResponse>> {
    let friends = social.list_friends(user.identity()).await?;
    Ok(Json(ListFriendsResponse { friends }))
}

/// List pending requests addressed to the caller (GET /api/friends/requests)
pub async fn list_friend_requests(
    State(social): State<Arc<SocialGraph>>,
    user: AuthUser,
) -> ChatResult<Json<ListFriendRequestsResponse>> {
    let requests = social.pending_requests(user.identity()).await?;
    Ok(Json(ListFriendRequestsResponse { requests }))
}

/// Direct history with a friend, oldest first (GET /api/messages/history/{username})
///
/// # Errors
///
/// * `403 Forbidden` - The caller and `username` are not friends
pub async fn get_direct_history(
    State(gate): State<AuthorizationGate>,
    State(store): State<Arc<dyn ChatStore>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> ChatResult<Json<DirectHistoryResponse>> {
    gate.require_direct_party(user.identity(), &username).await?;
    let messages = store.direct_history(user.identity().as_str(), &username).await?;
    Ok(Json(DirectHistoryResponse { messages }))
}

/// Latest message per conversation partner, newest first (GET /api/messages/recent)
pub async fn get_recent_conversations(
    State(store): State<Arc<dyn ChatStore>>,
    user: AuthUser,
) -> ChatResult<Json<RecentConversationsResponse>> {
    let conversations = store.recent_direct(user.identity().as_str()).await?;
    Ok(Json(RecentConversationsResponse { conversations }))
}
