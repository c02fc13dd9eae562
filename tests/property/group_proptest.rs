//! Property-based tests for group membership
//!
//! Whatever sequence of leave, kick and transfer operations runs against a
//! group, a surviving group always has its owner among its members, and a
//! group with no members no longer exists.

use proptest::prelude::*;
use std::sync::Arc;

use xfchat::backend::groups::GroupManager;
use xfchat::backend::realtime::{ChannelHub, MessageRouter};
use xfchat::backend::store::{ChatStore, MemoryStore};
use xfchat::shared::Identity;

const USERS: [&str; 5] = ["ann", "ben", "cat", "dan", "eli"];

#[derive(Debug, Clone)]
enum Op {
    Leave(usize),
    Kick(usize, usize),
    Transfer(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    let user = 0..USERS.len();
    prop_oneof![
        user.clone().prop_map(Op::Leave),
        (user.clone(), user.clone()).prop_map(|(a, b)| Op::Kick(a, b)),
        (user.clone(), user).prop_map(|(a, b)| Op::Transfer(a, b)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_owner_is_always_a_member(ops in prop::collection::vec(op(), 1..30)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async move {
            let store = Arc::new(MemoryStore::new());
            for user in USERS {
                store.ensure_user(user).await.unwrap();
            }
            let router = Arc::new(MessageRouter::new(store.clone(), ChannelHub::new(8), true));
            let groups = GroupManager::new(store.clone(), router);
            let others: Vec<String> = USERS[1..].iter().map(|u| u.to_string()).collect();
            let id = groups.create_group(&Identity::new(USERS[0]), "crew", &others).await.unwrap().id;

            for op in ops {
                let _ = match op {
                    Op::Leave(a) => groups.leave_group(&Identity::new(USERS[a]), id).await.map(|_| ()),
                    Op::Kick(a, b) => groups.kick_member(&Identity::new(USERS[a]), id, USERS[b]).await.map(|_| ()),
                    Op::Transfer(a, b) => groups
                        .transfer_ownership(&Identity::new(USERS[a]), id, USERS[b])
                        .await
                        .map(|_| ()),
                };

                match groups.find(id).await.unwrap() {
                    Some(group) => {
                        prop_assert!(group.is_member(&group.owner));
                        prop_assert!(!group.members.is_empty());
                    }
                    None => {
                        prop_assert!(store.groups_for(USERS[0]).await.unwrap().is_empty());
                        break;
                    }
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
