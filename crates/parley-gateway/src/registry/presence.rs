//! Online users and the one connection that reaches each of them
//!
//! A user is online exactly when they have an entry here. Nothing else
//! stores presence.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use parley_core::UserId;
use tracing::debug;

use crate::connection::{Connection, Delivery};
use crate::events::ServerEvent;

/// Maps each online user to their live connection
///
/// Every operation is a single `DashMap` call, so no shard lock outlives the
/// call and none is ever held across an `.await`.
#[derive(Default)]
pub struct PresenceRegistry {
    entries: DashMap<UserId, Arc<Connection>>,
    /// Held across a join's snapshot, register and broadcast, and across a
    /// leave's unregister and broadcast
    membership: Mutex<()>,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make `handle` the user's connection
    ///
    /// Returns the connection it displaced, if any. Re-registering the same
    /// connection displaces nothing.
    pub fn register(&self, handle: Arc<Connection>) -> Option<Arc<Connection>> {
        let user_id = handle.user_id();
        let prior = self
            .entries
            .insert(user_id, Arc::clone(&handle))
            .filter(|prior| !prior.same_as(&handle));

        debug!(
            user_id = %user_id,
            session_id = %handle.session_id(),
            replaced = prior.is_some(),
            "Registered connection"
        );
        prior
    }

    /// Remove the user's entry only if it is still `handle`
    ///
    /// Returns false when a newer connection has taken the slot; the caller
    /// must then treat the user as still online.
    pub fn unregister(&self, user_id: UserId, handle: &Connection) -> bool {
        let removed = self
            .entries
            .remove_if(&user_id, |_, current| current.same_as(handle))
            .is_some();

        if !removed {
            debug!(
                user_id = %user_id,
                session_id = %handle.session_id(),
                "Stale unregister ignored, a newer connection owns the entry"
            );
        }
        removed
    }

    /// Serialise joins and leaves
    ///
    /// With the guard held, a READY snapshot plus the presence updates that
    /// follow it cover every other user exactly. Only non-blocking work may
    /// run under the guard.
    pub fn membership(&self) -> MutexGuard<'_, ()> {
        self.membership.lock()
    }

    pub fn lookup(&self, user_id: UserId) -> Option<Arc<Connection>> {
        self.entries.get(&user_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Point-in-time copy of the online set
    pub fn snapshot_online_set(&self) -> HashSet<UserId> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    /// Point-in-time copy of every live connection, for fan-out
    pub fn all_connections(&self) -> Vec<Arc<Connection>> {
        self.entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue `event` for `user_id` if they are online
    pub fn deliver(&self, user_id: UserId, event: ServerEvent) -> Delivery {
        match self.lookup(user_id) {
            Some(connection) => connection.deliver(event),
            None => Delivery::Offline,
        }
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("online", &self.entries.len())
            .finish()
    }
}
