//! A single authenticated WebSocket connection
//!
//! The handle is what the presence registry stores and what the router
//! delivers through. It never touches the socket itself: events go into a
//! bounded queue that the connection's send task drains.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use parley_core::UserId;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::warn;

use crate::events::ServerEvent;
use crate::protocol::{CloseCode, GatewayMessage};

/// Items on a connection's outbound queue
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A dispatch event; sequenced by the send task
    Event(ServerEvent),
    /// A pre-built frame such as a heartbeat ack
    Frame(GatewayMessage),
}

/// What happened to a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The target had no live connection
    Offline,
    /// The target's queue was full; the event was dropped for that peer
    Dropped,
    /// The target's send task has already gone away
    Closed,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        self == Self::Delivered
    }
}

pub struct Connection {
    session_id: String,
    user_id: UserId,
    sender: mpsc::Sender<Outbound>,
    /// Last dispatch sequence number handed out
    sequence: AtomicU64,
    last_heartbeat: Mutex<Instant>,
    /// Set once; the first close reason wins
    close_signal: watch::Sender<Option<CloseCode>>,
    dropped: AtomicU64,
    created_at: Instant,
}

impl Connection {
    /// Create a handle plus the receiving end of its outbound queue
    pub fn new(
        session_id: impl Into<String>,
        user_id: UserId,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (close_signal, _) = watch::channel(None);
        let now = Instant::now();
        let connection = Arc::new(Self {
            session_id: session_id.into(),
            user_id,
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: Mutex::new(now),
            close_signal,
            dropped: AtomicU64::new(0),
            created_at: now,
        });
        (connection, receiver)
    }

    /// Unique per connection; this is what "same connection" means
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn same_as(&self, other: &Connection) -> bool {
        self.session_id == other.session_id
    }

    /// Queue an event without waiting
    ///
    /// A full queue drops the event for this connection only.
    pub fn deliver(&self, event: ServerEvent) -> Delivery {
        let event_type = event.event_type();
        match self.sender.try_send(Outbound::Event(event)) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    session_id = %self.session_id,
                    user_id = %self.user_id,
                    event = %event_type,
                    "Outbound queue full, dropping event"
                );
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Queue the answer to this connection's own request
    ///
    /// Waits for room instead of dropping: only peer deliveries may be lost
    /// to a full queue.
    pub async fn reply(&self, event: ServerEvent) -> Delivery {
        match self.sender.send(Outbound::Event(event)).await {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::Closed,
        }
    }

    /// Queue a raw frame without waiting
    pub fn send_frame(&self, frame: GatewayMessage) -> Delivery {
        match self.sender.try_send(Outbound::Frame(frame)) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    /// Ask the connection's tasks to shut down with `code`
    ///
    /// Returns false if a close was already requested.
    pub fn close(&self, code: CloseCode) -> bool {
        self.close_signal.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(code);
                true
            } else {
                false
            }
        })
    }

    pub fn close_reason(&self) -> Option<CloseCode> {
        *self.close_signal.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.close_reason().is_some() || self.sender.is_closed()
    }

    /// Watch for a close request
    pub fn closed(&self) -> watch::Receiver<Option<CloseCode>> {
        self.close_signal.subscribe()
    }

    /// Events dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("sequence", &self.current_sequence())
            .field("close_reason", &self.close_reason())
            .finish()
    }
}
