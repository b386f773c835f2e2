//! Session bookkeeping shared by both transports.
//!
//! A [`SessionStore`] maps server-generated identifiers to channel handles.
//! Each transport kind owns its own store; identifiers are never reused once
//! removed.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

/// Concurrent map from session id to channel.
pub struct SessionStore<S> {
    kind: &'static str,
    sessions: DashMap<String, Arc<S>>,
}

impl<S> SessionStore<S> {
    /// `kind` only labels log lines ("streamable", "sse").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            sessions: DashMap::new(),
        }
    }

    /// Register `channel` under a fresh identifier.
    pub fn create(&self, channel: S) -> (String, Arc<S>) {
        let (id, channel, ()) = self.create_with(|_| (channel, ()));
        (id, channel)
    }

    /// Register a channel built from its own identifier. `build` also
    /// returns whatever else needs the id (e.g. a session worker).
    pub fn create_with<T>(&self, build: impl FnOnce(&str) -> (S, T)) -> (String, Arc<S>, T) {
        let (id, slot) = loop {
            let id = Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                break (id, slot);
            }
        };
        let (channel, extra) = build(&id);
        let channel = Arc::new(channel);
        slot.insert(Arc::clone(&channel));
        debug!(kind = self.kind, session_id = %id, "session opened");
        (id, channel, extra)
    }

    pub fn get(&self, id: &str) -> Option<Arc<S>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Close a session. Returns the channel if it was open.
    pub fn remove(&self, id: &str) -> Option<Arc<S>> {
        let (_, channel) = self.sessions.remove(id)?;
        debug!(kind = self.kind, session_id = %id, "session closed");
        Some(channel)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Removes its session from the store when dropped.
///
/// Tied to the lifetime of a connection (e.g. an SSE response stream) so the
/// session disappears when either side hangs up.
pub struct SessionGuard<S> {
    store: Arc<SessionStore<S>>,
    id: String,
}

impl<S> SessionGuard<S> {
    pub fn new(store: Arc<SessionStore<S>>, id: String) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<S> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.store.remove(&self.id);
    }
}
