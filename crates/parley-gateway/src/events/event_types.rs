//! Gateway event types
//!
//! The names sent in the `t` field of dispatch frames.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    /// First dispatch after a successful handshake
    Ready,
    /// Another user came online or went offline
    PresenceUpdate,
    /// A message addressed to this user
    MessageCreate,
    TypingIndicator,
    /// A message this user sent was read by its receiver
    MessageRead,
    /// Answer to this session's own send-message
    MessageAck,
    /// Answer to this session's own mark-read
    MarkReadAck,
    /// A request from this session was refused; the connection stays open
    RequestRejected,
}

impl GatewayEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::PresenceUpdate => "PRESENCE_UPDATE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::TypingIndicator => "TYPING_INDICATOR",
            Self::MessageRead => "MESSAGE_READ",
            Self::MessageAck => "MESSAGE_ACK",
            Self::MarkReadAck => "MARK_READ_ACK",
            Self::RequestRejected => "REQUEST_REJECTED",
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_matches_serde() {
        for event in [
            GatewayEventType::Ready,
            GatewayEventType::PresenceUpdate,
            GatewayEventType::MessageCreate,
            GatewayEventType::TypingIndicator,
            GatewayEventType::MessageRead,
            GatewayEventType::MessageAck,
            GatewayEventType::MarkReadAck,
            GatewayEventType::RequestRejected,
        ] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }
}
