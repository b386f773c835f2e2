//! Tests for the session store

use std::collections::HashSet;
use std::sync::Arc;

use super::session::{SessionGuard, SessionStore};

#[test]
fn test_create_and_get_return_same_channel() {
    let store = SessionStore::new("test");

    let (id, channel) = store.create(String::from("channel-a"));
    let found = store.get(&id).unwrap();

    assert!(Arc::ptr_eq(&channel, &found));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_ids_are_unique() {
    let store = SessionStore::new("test");

    let ids: HashSet<String> = (0..100).map(|i| store.create(i).0).collect();

    assert_eq!(ids.len(), 100);
    assert_eq!(store.len(), 100);
}

#[test]
fn test_unknown_id_is_not_found() {
    let store = SessionStore::new("test");
    store.create(1u8);

    assert!(store.get("not-a-session").is_none());
    assert!(!store.contains("not-a-session"));
}

#[test]
fn test_remove_is_terminal() {
    let store = SessionStore::new("test");
    let (id, _) = store.create(1u8);

    assert!(store.remove(&id).is_some());
    assert!(store.get(&id).is_none());
    assert!(store.remove(&id).is_none());
    assert!(store.is_empty());
}

#[test]
fn test_create_with_builds_channel_from_its_id() {
    let store = SessionStore::new("test");

    let (id, channel, echoed) = store.create_with(|id| (format!("worker-{id}"), id.to_string()));

    assert_eq!(echoed, id);
    assert_eq!(*channel, format!("worker-{id}"));
    assert!(Arc::ptr_eq(&channel, &store.get(&id).unwrap()));
}

#[test]
fn test_guard_removes_session_on_drop() {
    let store = Arc::new(SessionStore::new("test"));
    let (id, _) = store.create(());

    let guard = SessionGuard::new(Arc::clone(&store), id.clone());
    assert_eq!(guard.id(), id);
    assert!(store.contains(&id));

    drop(guard);
    assert!(!store.contains(&id));
}

#[test]
fn test_concurrent_creates_and_removes() {
    let store = Arc::new(SessionStore::new("test"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let (id, _) = store.create(i);
                    if i % 2 == 0 {
                        store.remove(&id);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 8 * 25);
}
