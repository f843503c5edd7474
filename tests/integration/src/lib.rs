//! End-to-end test utilities
//!
//! Runs the whole server (REST, health, WebSocket gateway) on an ephemeral
//! port with the in-memory store, and drives it with `reqwest` and
//! `tokio-tungstenite` clients.

pub mod fixtures;
pub mod gateway;
pub mod helpers;

pub use fixtures::*;
pub use gateway::GatewayClient;
pub use helpers::*;
