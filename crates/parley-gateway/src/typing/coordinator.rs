//! Typing coordinator
//!
//! Tracks who is typing to whom and guarantees that every indicator that was
//! switched on is eventually switched off, even if the typist goes quiet or
//! disconnects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parley_core::UserId;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::events::ServerEvent;
use crate::registry::PresenceRegistry;

pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_secs(5);

struct TypingEntry {
    /// Identifies the timer that is allowed to expire this entry
    generation: u64,
    timer: JoinHandle<()>,
}

pub struct TypingCoordinator {
    registry: Arc<PresenceRegistry>,
    timeout: Duration,
    /// (sender, receiver) -> armed timer
    states: DashMap<(UserId, UserId), TypingEntry>,
    generations: AtomicU64,
    /// Handed to timer tasks so they never keep the coordinator alive
    this: Weak<Self>,
}

impl TypingCoordinator {
    pub fn new(registry: Arc<PresenceRegistry>, timeout: Duration) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            registry,
            timeout,
            states: DashMap::new(),
            generations: AtomicU64::new(0),
            this: this.clone(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Switch the sender's indicator at the receiver on or off
    ///
    /// `true` (re)arms the expiry timer; `false` cancels it. The receiver is
    /// told either way, and a stop for a pair that was not typing is harmless.
    /// Must be called from within a Tokio runtime.
    ///
    /// Every event for a pair is queued while that pair's entry is locked, so
    /// the receiver sees events in the order the state changed.
    pub fn set_typing(&self, sender: UserId, receiver: UserId, is_typing: bool) {
        let key = (sender, receiver);
        let event = ServerEvent::typing(sender, is_typing);

        if is_typing {
            let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
            let timer = self.arm(key, generation);
            let entry = TypingEntry { generation, timer };
            let _locked = match self.states.entry(key) {
                Entry::Occupied(mut occupied) => {
                    occupied.insert(entry).timer.abort();
                    occupied.into_ref()
                }
                Entry::Vacant(vacant) => vacant.insert(entry),
            };
            self.registry.deliver(receiver, event);
            trace!(sender = %sender, receiver = %receiver, generation, "Typing armed");
        } else {
            match self.states.entry(key) {
                Entry::Occupied(occupied) => {
                    self.registry.deliver(receiver, event);
                    occupied.remove().timer.abort();
                }
                Entry::Vacant(_locked) => {
                    self.registry.deliver(receiver, event);
                }
            }
        }
    }

    /// Stop every indicator owned by `sender`
    pub fn clear_sender(&self, sender: UserId) {
        let keys: Vec<(UserId, UserId)> = self
            .states
            .iter()
            .filter(|entry| entry.key().0 == sender)
            .map(|entry| *entry.key())
            .collect();

        for key in keys {
            if let Entry::Occupied(occupied) = self.states.entry(key) {
                self.registry.deliver(key.1, ServerEvent::typing(sender, false));
                occupied.remove().timer.abort();
                debug!(sender = %sender, receiver = %key.1, "Typing cleared on disconnect");
            }
        }
    }

    pub fn is_typing(&self, sender: UserId, receiver: UserId) -> bool {
        self.states.contains_key(&(sender, receiver))
    }

    pub fn active_count(&self) -> usize {
        self.states.len()
    }

    fn arm(&self, key: (UserId, UserId), generation: u64) -> JoinHandle<()> {
        let this = self.this.clone();
        // Counted from the state change, not from when the task first runs
        let deadline = tokio::time::Instant::now() + self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(coordinator) = this.upgrade() {
                coordinator.expire(key, generation);
            }
        })
    }

    fn expire(&self, key: (UserId, UserId), generation: u64) {
        let Entry::Occupied(occupied) = self.states.entry(key) else {
            return;
        };
        // A newer start re-armed the pair; its own timer owns the entry now
        if occupied.get().generation != generation {
            return;
        }

        self.registry.deliver(key.1, ServerEvent::typing(key.0, false));
        occupied.remove();
        debug!(sender = %key.0, receiver = %key.1, "Typing expired");
    }
}

impl Drop for TypingCoordinator {
    fn drop(&mut self) {
        for entry in self.states.iter() {
            entry.timer.abort();
        }
    }
}

impl std::fmt::Debug for TypingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingCoordinator")
            .field("timeout", &self.timeout)
            .field("active", &self.states.len())
            .finish()
    }
}
