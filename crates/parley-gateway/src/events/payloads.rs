//! Dispatch event payloads
//!
//! All payloads serialize with camelCase field names.

use chrono::{DateTime, Utc};
use parley_core::{Message, MessageId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GatewayEventType;
use crate::protocol::GatewayMessage;

/// Wire view of a persisted message, shared by dispatch events and REST bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub file_url: Option<String>,
    pub is_group_message: bool,
}

impl From<&Message> for MessagePayload {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content.clone(),
            created_at: message.created_at,
            is_read: message.is_read,
            file_url: message.attachment_url.clone(),
            is_group_message: message.is_group,
        }
    }
}

impl From<Message> for MessagePayload {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            created_at: message.created_at,
            is_read: message.is_read,
            file_url: message.attachment_url,
            is_group_message: message.is_group,
        }
    }
}

/// READY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyEvent {
    pub session_id: String,
    pub user_id: UserId,
    /// Everyone online at the moment of the handshake, this user excluded
    pub online_users: Vec<UserId>,
}

/// PRESENCE_UPDATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    pub user_id: UserId,
    pub online: bool,
}

/// TYPING_INDICATOR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicatorEvent {
    pub sender_id: UserId,
    pub is_typing: bool,
}

/// MESSAGE_READ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReadEvent {
    pub message_id: MessageId,
}

/// MESSAGE_ACK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAckEvent {
    pub nonce: Option<String>,
    pub message: MessagePayload,
}

/// MARK_READ_ACK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadAckEvent {
    pub nonce: Option<String>,
    pub message_id: MessageId,
}

/// REQUEST_REJECTED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRejectedEvent {
    pub nonce: Option<String>,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

/// An event queued for one connection
///
/// The sequence number is assigned when the send task writes it, so queued
/// events that get dropped never leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Ready(ReadyEvent),
    PresenceUpdate(PresenceEvent),
    MessageCreate(MessagePayload),
    TypingIndicator(TypingIndicatorEvent),
    MessageRead(MessageReadEvent),
    MessageAck(MessageAckEvent),
    MarkReadAck(MarkReadAckEvent),
    RequestRejected(RequestRejectedEvent),
}

impl ServerEvent {
    #[must_use]
    pub const fn event_type(&self) -> GatewayEventType {
        match self {
            Self::Ready(_) => GatewayEventType::Ready,
            Self::PresenceUpdate(_) => GatewayEventType::PresenceUpdate,
            Self::MessageCreate(_) => GatewayEventType::MessageCreate,
            Self::TypingIndicator(_) => GatewayEventType::TypingIndicator,
            Self::MessageRead(_) => GatewayEventType::MessageRead,
            Self::MessageAck(_) => GatewayEventType::MessageAck,
            Self::MarkReadAck(_) => GatewayEventType::MarkReadAck,
            Self::RequestRejected(_) => GatewayEventType::RequestRejected,
        }
    }

    pub fn data(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Ready(e) => serde_json::to_value(e),
            Self::PresenceUpdate(e) => serde_json::to_value(e),
            Self::MessageCreate(e) => serde_json::to_value(e),
            Self::TypingIndicator(e) => serde_json::to_value(e),
            Self::MessageRead(e) => serde_json::to_value(e),
            Self::MessageAck(e) => serde_json::to_value(e),
            Self::MarkReadAck(e) => serde_json::to_value(e),
            Self::RequestRejected(e) => serde_json::to_value(e),
        }
    }

    /// Wrap in a dispatch frame carrying `sequence`
    pub fn into_dispatch(self, sequence: u64) -> Result<GatewayMessage, serde_json::Error> {
        let data = self.data()?;
        Ok(GatewayMessage::dispatch(
            self.event_type().as_str(),
            sequence,
            data,
        ))
    }

    pub fn presence(user_id: UserId, online: bool) -> Self {
        Self::PresenceUpdate(PresenceEvent { user_id, online })
    }

    pub fn typing(sender_id: UserId, is_typing: bool) -> Self {
        Self::TypingIndicator(TypingIndicatorEvent {
            sender_id,
            is_typing,
        })
    }
}
