//! Messaging Module
//!
//! This module contains all the data structures for the messaging system:
//!
//! - `FriendRequest` - A directional friend proposal between users
//! - `Group` - A named member set with one owner
//! - `DirectMessage` / `GroupMessage` - Persisted chat messages
//!
//! # Usage
//!
//! ```rust
//! use xfchat::shared::messaging::{DirectMessage, FriendRequest, Group, GroupMessage};
//! ```

pub mod friend_request;
pub mod group;
pub mod message;

// Re-export all types
pub use friend_request::{
    FriendRequest, FriendRequestStatus, ListFriendRequestsResponse, ListFriendsResponse,
    RespondFriendRequestRequest, SendFriendRequestRequest,
};
pub use group::{
    validate_group_name, CreateGroupRequest, Group, ListGroupsResponse, ListMembersResponse,
    MemberRequest, RenameGroupRequest, MAX_GROUP_NAME_CHARS,
};
pub use message::{
    validate_content, DirectDraft, DirectHistoryResponse, DirectMessage, GroupDraft,
    GroupHistoryResponse, GroupMessage, RecentConversationsResponse, MAX_CONTENT_CHARS,
    SYSTEM_SENDER,
};
