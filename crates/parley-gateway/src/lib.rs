//! # parley-gateway
//!
//! The real-time core: who is online, which socket reaches them, and how
//! chat events travel between sessions.
//!
//! - [`registry::PresenceRegistry`] maps each online user to exactly one live connection
//! - [`session::Session`] is the per-connection state machine
//! - [`router::EventRouter`] persists, then delivers, every client-visible event
//! - [`typing::TypingCoordinator`] owns typing indicators and their expiry timers
//! - [`server`] hosts it all behind an axum WebSocket route

pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod store;
pub mod typing;

pub use connection::{Connection, Delivery, Outbound};
pub use events::{GatewayEventType, MessagePayload, ServerEvent};
pub use protocol::{CloseCode, GatewayMessage, OpCode};
pub use registry::PresenceRegistry;
pub use router::{EventRouter, OutgoingMessage, RouterError};
pub use server::{create_router, gateway_handler, GatewayState};
pub use session::{Session, SessionState};
pub use store::MessageStoreAdapter;
pub use typing::TypingCoordinator;
