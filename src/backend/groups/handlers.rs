/**
 * Group HTTP Handlers
 *
 * Handlers for `/api/groups`. Every handler runs behind `auth_middleware`
 * and acts as the authenticated caller.
 *
 * # Responses
 *
 * Mutations return a `GroupChange` body: the resulting value plus the SYSTEM
 * notice that was broadcast on the group channel, if any.
 *
 * ```json
 * {
 *   "value": {"id": 7, "name": "crew", "owner": "bob", "members": ["bob", "carol"]},
 *   "notice": {"id": 41, "group_id": 7, "sender": "SYSTEM", "content": "alice has left the group. Ownership transferred to: bob", "timestamp": "..."}
 * }
 * ```
 *
 * # Reads
 *
 * `members` and `history` check that the group exists (404) before checking
 * that the caller is a member (403).
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::backend::authorization::AuthorizationGate;
use crate::backend::error::ChatResult;
use crate::backend::groups::{GroupChange, GroupManager};
use crate::backend::middleware::AuthUser;
use crate::backend::store::ChatStore;
use crate::shared::messaging::{
    CreateGroupRequest, Group, GroupHistoryResponse, ListGroupsResponse, ListMembersResponse,
    MemberRequest, RenameGroupRequest,
};

/// Create a group owned by the caller (POST /api/groups)
///
/// Unknown usernames in `member_usernames` are skipped.
///
/// # Errors
///
/// * `400 Bad Request` - Blank or over-long name
pub async fn create_group(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> ChatResult<(StatusCode, Json<Group>)> {
    let group = groups
        .create_group(user.identity(), &request.name, &request.member_usernames)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// List the caller's groups (GET /api/groups)
pub async fn list_groups(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
) -> ChatResult<Json<ListGroupsResponse>> {
    let groups = groups.groups_for(user.identity()).await?;
    Ok(Json(ListGroupsResponse { groups }))
}

/// Member list (GET /api/groups/{id}/members)
pub async fn get_group_members(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> ChatResult<Json<ListMembersResponse>> {
    let group = groups.get_group_members(user.identity(), group_id).await?;
    Ok(Json(ListMembersResponse {
        group_id: group.id,
        owner: group.owner,
        members: group.members.into_iter().collect(),
    }))
}

/// Group history, oldest first, SYSTEM notices included (GET /api/groups/{id}/history)
pub async fn get_group_history(
    State(gate): State<AuthorizationGate>,
    State(store): State<Arc<dyn ChatStore>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> ChatResult<Json<GroupHistoryResponse>> {
    gate.require_group_member(user.identity(), group_id).await?;
    let messages = store.group_history(group_id).await?;
    Ok(Json(GroupHistoryResponse { group_id, messages }))
}

/// Leave a group (POST /api/groups/{id}/leave)
///
/// `value` is `null` when the caller was the last member and the group was
/// deleted.
pub async fn leave_group(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> ChatResult<Json<GroupChange<Option<Group>>>> {
    Ok(Json(groups.leave_group(user.identity(), group_id).await?))
}

/// Owner removes a member (POST /api/groups/{id}/kick)
pub async fn kick_member(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(request): Json<MemberRequest>,
) -> ChatResult<Json<GroupChange<Group>>> {
    Ok(Json(groups.kick_member(user.identity(), group_id, &request.username).await?))
}

/// Owner renames the group (PUT /api/groups/{id}/name)
pub async fn rename_group(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(request): Json<RenameGroupRequest>,
) -> ChatResult<Json<GroupChange<Group>>> {
    Ok(Json(groups.rename_group(user.identity(), group_id, &request.name).await?))
}

/// Owner hands ownership to another member (PUT /api/groups/{id}/owner)
pub async fn transfer_ownership(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(request): Json<MemberRequest>,
) -> ChatResult<Json<GroupChange<Group>>> {
    Ok(Json(
        groups
            .transfer_ownership(user.identity(), group_id, &request.username)
            .await?,
    ))
}

/// Owner deletes the group (DELETE /api/groups/{id})
pub async fn delete_group(
    State(groups): State<Arc<GroupManager>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> ChatResult<Json<GroupChange<()>>> {
    Ok(Json(groups.delete_group(user.identity(), group_id).await?))
}
