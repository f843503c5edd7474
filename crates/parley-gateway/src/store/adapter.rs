//! Message store adapter
//!
//! Assigns identity (Snowflake id and creation time) to drafts and turns
//! "absent" answers from the repository into domain errors.

use std::sync::Arc;

use chrono::Utc;
use parley_core::{
    DomainError, Message, MessageId, MessageRepository, NewMessage, ReadTransition, RepoResult,
    SnowflakeGenerator, UserId,
};
use tracing::instrument;

pub struct MessageStoreAdapter {
    messages: Arc<dyn MessageRepository>,
    ids: Arc<SnowflakeGenerator>,
}

impl MessageStoreAdapter {
    pub fn new(messages: Arc<dyn MessageRepository>, ids: Arc<SnowflakeGenerator>) -> Self {
        Self { messages, ids }
    }

    /// Persist a validated draft and return the canonical message
    ///
    /// Fails with `UserNotFound` if either participant does not exist.
    #[instrument(skip(self, draft), fields(sender = %draft.sender_id, receiver = %draft.receiver_id))]
    pub async fn create_message(&self, draft: NewMessage) -> RepoResult<Message> {
        let message = Message::from_draft(self.ids.generate(), Utc::now(), draft);
        self.messages.create(&message).await?;
        Ok(message)
    }

    pub async fn get_message(&self, id: MessageId) -> RepoResult<Message> {
        self.messages
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound(id))
    }

    /// Set the read flag; `transitioned` is true for exactly one caller
    pub async fn set_read(&self, id: MessageId) -> RepoResult<ReadTransition> {
        self.messages
            .mark_read(id)
            .await?
            .ok_or(DomainError::MessageNotFound(id))
    }

    /// Conversation history between two users, oldest first
    pub async fn list_messages_between(&self, a: UserId, b: UserId) -> RepoResult<Vec<Message>> {
        self.messages.list_between(a, b).await
    }
}

impl std::fmt::Debug for MessageStoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStoreAdapter")
            .field("worker_id", &self.ids.worker_id())
            .finish_non_exhaustive()
    }
}
