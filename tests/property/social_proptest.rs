//! Property-based tests for the social graph
//!
//! Random sequences of friend operations over a small user set must keep the
//! friendship relation symmetric and irreflexive, and `are_friends` must
//! agree with a model built from the accepted and removed pairs.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use xfchat::backend::social::SocialGraph;
use xfchat::backend::store::{ChatStore, FriendPair, MemoryStore};
use xfchat::shared::Identity;

const USERS: [&str; 4] = ["ann", "ben", "cat", "dan"];

#[derive(Debug, Clone)]
enum Op {
    Request(usize, usize),
    Accept(usize, usize),
    Reject(usize, usize),
    Remove(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    let pair = (0..USERS.len(), 0..USERS.len());
    prop_oneof![
        pair.clone().prop_map(|(a, b)| Op::Request(a, b)),
        pair.clone().prop_map(|(a, b)| Op::Accept(a, b)),
        pair.clone().prop_map(|(a, b)| Op::Reject(a, b)),
        pair.prop_map(|(a, b)| Op::Remove(a, b)),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_friendship_matches_model(ops in prop::collection::vec(op(), 1..40)) {
        runtime().block_on(async move {
            let store = Arc::new(MemoryStore::new());
            for user in USERS {
                store.ensure_user(user).await.unwrap();
            }
            let graph = SocialGraph::new(store.clone());
            let mut model: BTreeSet<FriendPair> = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Request(a, b) => {
                        let result = graph.send_friend_request(&Identity::new(USERS[a]), USERS[b]).await;
                        if a == b {
                            prop_assert!(result.is_err());
                        }
                    }
                    Op::Accept(a, b) => {
                        // `a` accepts a request sent by `b`
                        if graph.accept_friend_request(&Identity::new(USERS[a]), USERS[b]).await.is_ok() {
                            model.insert(FriendPair::new(USERS[a], USERS[b]));
                        }
                    }
                    Op::Reject(a, b) => {
                        let _ = graph.reject_friend_request(&Identity::new(USERS[a]), USERS[b]).await;
                    }
                    Op::Remove(a, b) => {
                        let removed = graph.remove_friend(&Identity::new(USERS[a]), USERS[b]).await.is_ok();
                        prop_assert_eq!(removed, model.remove(&FriendPair::new(USERS[a], USERS[b])));
                    }
                }
            }

            for a in USERS {
                prop_assert!(!graph.are_friends(a, a).await.unwrap());
                for b in USERS {
                    let ab = graph.are_friends(a, b).await.unwrap();
                    let ba = graph.are_friends(b, a).await.unwrap();
                    prop_assert_eq!(ab, ba);
                    if a != b {
                        prop_assert_eq!(ab, model.contains(&FriendPair::new(a, b)));
                    }
                }
                let listed = graph.list_friends(&Identity::new(a)).await.unwrap();
                for friend in &listed {
                    prop_assert!(graph.are_friends(a, friend).await.unwrap());
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn test_self_request_always_fails(name in "[a-z]{1,12}") {
        runtime().block_on(async move {
            let store = Arc::new(MemoryStore::new());
            store.ensure_user(&name).await.unwrap();
            let graph = SocialGraph::new(store.clone());

            prop_assert!(graph.send_friend_request(&Identity::new(name.as_str()), &name).await.is_err());
            prop_assert!(graph.pending_requests(&Identity::new(name.as_str())).await.unwrap().is_empty());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
