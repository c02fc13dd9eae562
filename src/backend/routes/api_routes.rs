/**
 * API Route Handlers
 *
 * This module defines the bearer-authenticated REST endpoints:
 * - Friend requests and friendships
 * - Direct message history
 * - Group management and history
 *
 * # Routes
 *
 * ## Friends
 * - `POST /api/friends/request` - Send a friend request
 * - `POST /api/friends/accept` - Accept a pending request
 * - `POST /api/friends/reject` - Reject a pending request
 * - `DELETE /api/friends/{username}` - Remove a friendship
 * - `GET /api/friends` - List friends
 * - `GET /api/friends/requests` - Pending requests received
 *
 * ## Messages
 * - `GET /api/messages/history/{username}` - Direct history with a friend
 * - `GET /api/messages/recent` - Latest message per conversation
 *
 * ## Groups
 * - `POST /api/groups` / `GET /api/groups`
 * - `GET /api/groups/{id}/members` / `GET /api/groups/{id}/history`
 * - `POST /api/groups/{id}/leave` / `POST /api/groups/{id}/kick`
 * - `PUT /api/groups/{id}/name` / `PUT /api/groups/{id}/owner`
 * - `DELETE /api/groups/{id}`
 */

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::groups::handlers as groups;
use crate::backend::messaging::handlers as messaging;
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Every route added here sits behind `auth_middleware`, so handlers can
/// rely on the `AuthUser` extractor.
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `app_state` - State handed to the authentication middleware
pub fn configure_api_routes(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    let api = Router::new()
        // Friend graph
        .route("/api/friends", get(messaging::list_friends))
        .route("/api/friends/request", post(messaging::send_friend_request))
        .route("/api/friends/accept", post(messaging::accept_friend_request))
        .route("/api/friends/reject", post(messaging::reject_friend_request))
        .route("/api/friends/requests", get(messaging::list_friend_requests))
        .route("/api/friends/{username}", delete(messaging::remove_friend))
        // Direct history
        .route("/api/messages/history/{username}", get(messaging::get_direct_history))
        .route("/api/messages/recent", get(messaging::get_recent_conversations))
        // Groups
        .route("/api/groups", post(groups::create_group).get(groups::list_groups))
        .route("/api/groups/{id}", delete(groups::delete_group))
        .route("/api/groups/{id}/members", get(groups::get_group_members))
        .route("/api/groups/{id}/history", get(groups::get_group_history))
        .route("/api/groups/{id}/leave", post(groups::leave_group))
        .route("/api/groups/{id}/kick", post(groups::kick_member))
        .route("/api/groups/{id}/name", put(groups::rename_group))
        .route("/api/groups/{id}/owner", put(groups::transfer_ownership))
        .route_layer(middleware::from_fn_with_state(app_state, auth_middleware));

    router.merge(api)
}
