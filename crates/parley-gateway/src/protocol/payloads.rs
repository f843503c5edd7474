//! Client and handshake payloads
//!
//! Field names are camelCase on the wire. Ids accept either JSON strings or
//! numbers.

use parley_core::{MessageId, UserId};
use serde::{Deserialize, Serialize};

/// Default heartbeat interval in milliseconds
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 41_250;

/// Hello payload (op=10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// How often the client must send op=1, in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_interval(DEFAULT_HEARTBEAT_INTERVAL_MS)
    }

    #[must_use]
    pub const fn with_interval(interval_ms: u64) -> Self {
        Self {
            heartbeat_interval: interval_ms,
        }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Send message payload (op=3)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    /// Echoed back in the ack or rejection so the client can match them up
    #[serde(default)]
    pub nonce: Option<String>,
    pub receiver_id: UserId,
    pub content: String,
    #[serde(default, alias = "file_url")]
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_group_message: bool,
}

/// Mark read payload (op=4)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    #[serde(default)]
    pub nonce: Option<String>,
    pub message_id: MessageId,
}

/// Typing start/stop payload (op=5, op=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub receiver_id: UserId,
}
