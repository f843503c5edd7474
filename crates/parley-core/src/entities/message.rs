//! Message entity - a direct message between two users

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Longest accepted message body, in characters
pub const MAX_CONTENT_LENGTH: usize = 4000;

/// A persisted message
///
/// Everything except `is_read` is fixed once the store has assigned `id` and
/// `created_at`; `is_read` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub attachment_url: Option<String>,
    pub is_group: bool,
}

impl Message {
    /// Materialize a draft with the identity the store assigned to it
    pub fn from_draft(id: MessageId, created_at: DateTime<Utc>, draft: NewMessage) -> Self {
        Self {
            id,
            sender_id: draft.sender_id,
            receiver_id: draft.receiver_id,
            content: draft.content,
            created_at,
            is_read: false,
            attachment_url: draft.attachment_url,
            is_group: draft.is_group,
        }
    }

    /// Set the read flag, returning whether this call changed it
    pub fn mark_read(&mut self) -> bool {
        let transitioned = !self.is_read;
        self.is_read = true;
        transitioned
    }

    /// Whether `user` is one of the two participants
    #[inline]
    pub fn involves(&self, user: UserId) -> bool {
        self.sender_id == user || self.receiver_id == user
    }

    /// The participant that is not `user`
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if self.sender_id == user {
            Some(self.receiver_id)
        } else if self.receiver_id == user {
            Some(self.sender_id)
        } else {
            None
        }
    }
}

/// A message that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub attachment_url: Option<String>,
    pub is_group: bool,
}

impl NewMessage {
    pub fn new(sender_id: UserId, receiver_id: UserId, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            receiver_id,
            content: content.into(),
            attachment_url: None,
            is_group: false,
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, url: Option<String>) -> Self {
        self.attachment_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Check the shape of the draft; receiver existence is the store's job
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "content must not be empty".to_string(),
            ));
        }
        if self.content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
            });
        }
        if self.receiver_id.is_zero() {
            return Err(DomainError::ValidationError(
                "receiver id is required".to_string(),
            ));
        }
        if self.receiver_id == self.sender_id {
            return Err(DomainError::ValidationError(
                "cannot send a message to yourself".to_string(),
            ));
        }
        if self.is_group {
            return Err(DomainError::ValidationError(
                "group messages are not supported".to_string(),
            ));
        }
        Ok(())
    }
}
