//! Group Data Structure
//!
//! A group is a named member set with exactly one owner. The owner is always
//! a member, and a group with no members does not exist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::shared::error::SharedError;

/// Upper bound on a group name, in characters
pub const MAX_GROUP_NAME_CHARS: usize = 100;

/// A chat group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Immutable group ID
    pub id: i64,
    /// Display name, changeable by the owner
    pub name: String,
    /// Username of the current owner
    pub owner: String,
    /// Usernames of all members, owner included
    pub members: BTreeSet<String>,
}

impl Group {
    pub fn is_member(&self, username: &str) -> bool {
        self.members.contains(username)
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.owner == username
    }

    /// Lowest remaining username, used when the owner leaves
    pub fn successor(&self) -> Option<&String> {
        self.members.iter().next()
    }
}

/// Check a group name supplied on create or rename
pub fn validate_group_name(name: &str) -> Result<(), SharedError> {
    if name.trim().is_empty() {
        return Err(SharedError::validation("name", "Group name cannot be empty"));
    }
    if name.chars().count() > MAX_GROUP_NAME_CHARS {
        return Err(SharedError::validation(
            "name",
            format!("Group name exceeds {} characters", MAX_GROUP_NAME_CHARS),
        ));
    }
    Ok(())
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_usernames: Vec<String>,
}

/// Request to rename a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameGroupRequest {
    pub name: String,
}

/// Request naming a member (kick target or new owner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRequest {
    pub username: String,
}

/// Response for listing groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<Group>,
}

/// Response for listing group members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub group_id: i64,
    pub owner: String,
    pub members: Vec<String>,
}
