//! Event router
//!
//! The only path by which chat events reach other users. Writes go to the
//! store first; a peer is looked up and notified only after the store has
//! accepted the change.

use std::collections::HashSet;
use std::sync::Arc;

use parley_core::{DomainError, Message, MessageId, NewMessage, UserId};
use tracing::{debug, instrument};

use super::RouterError;
use crate::events::{MessagePayload, MessageReadEvent, ServerEvent};
use crate::registry::PresenceRegistry;
use crate::store::MessageStoreAdapter;
use crate::typing::TypingCoordinator;

/// A message as submitted by its sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub receiver_id: UserId,
    pub content: String,
    pub attachment_url: Option<String>,
    pub is_group: bool,
}

impl OutgoingMessage {
    pub fn new(receiver_id: UserId, content: impl Into<String>) -> Self {
        Self {
            receiver_id,
            content: content.into(),
            attachment_url: None,
            is_group: false,
        }
    }

    fn into_draft(self, sender_id: UserId) -> NewMessage {
        let mut draft = NewMessage::new(sender_id, self.receiver_id, self.content)
            .with_attachment(self.attachment_url);
        draft.is_group = self.is_group;
        draft
    }
}

pub struct EventRouter {
    registry: Arc<PresenceRegistry>,
    store: Arc<MessageStoreAdapter>,
    typing: Arc<TypingCoordinator>,
}

impl EventRouter {
    pub fn new(
        registry: Arc<PresenceRegistry>,
        store: Arc<MessageStoreAdapter>,
        typing: Arc<TypingCoordinator>,
    ) -> Self {
        Self {
            registry,
            store,
            typing,
        }
    }

    pub fn registry(&self) -> &Arc<PresenceRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<MessageStoreAdapter> {
        &self.store
    }

    pub fn typing(&self) -> &Arc<TypingCoordinator> {
        &self.typing
    }

    /// Persist a message, then push it to the receiver if they are online
    ///
    /// The sender is not pushed a copy; the returned message is their answer.
    /// An offline receiver is not an error.
    #[instrument(skip(self, outgoing), fields(sender = %sender, receiver = %outgoing.receiver_id))]
    pub async fn send_message(
        &self,
        sender: UserId,
        outgoing: OutgoingMessage,
    ) -> Result<Message, RouterError> {
        let draft = outgoing.into_draft(sender);
        draft.validate()?;

        let message = self.store.create_message(draft).await?;

        let delivery = self.registry.deliver(
            message.receiver_id,
            ServerEvent::MessageCreate(MessagePayload::from(&message)),
        );
        debug!(message_id = %message.id, ?delivery, "Message routed");
        Ok(message)
    }

    /// Mark a message read on behalf of its receiver
    ///
    /// The sender hears about it only on the actual unread-to-read
    /// transition, so repeats and races produce a single notification.
    #[instrument(skip(self), fields(reader = %reader))]
    pub async fn mark_read(
        &self,
        reader: UserId,
        message_id: MessageId,
    ) -> Result<Message, RouterError> {
        let message = self.store.get_message(message_id).await?;
        if message.receiver_id != reader {
            return Err(DomainError::NotMessageReceiver.into());
        }

        let outcome = self.store.set_read(message_id).await?;
        if outcome.transitioned {
            let delivery = self.registry.deliver(
                outcome.message.sender_id,
                ServerEvent::MessageRead(MessageReadEvent { message_id }),
            );
            debug!(message_id = %message_id, ?delivery, "Read receipt routed");
        }
        Ok(outcome.message)
    }

    pub fn set_typing(
        &self,
        sender: UserId,
        receiver: UserId,
        is_typing: bool,
    ) -> Result<(), RouterError> {
        if receiver.is_zero() || receiver == sender {
            return Err(RouterError::InvalidRequest(
                "typing target must be another user".to_string(),
            ));
        }
        self.typing.set_typing(sender, receiver, is_typing);
        Ok(())
    }

    /// Tell every other live session that `user` came online or went offline
    pub fn broadcast_presence(&self, user: UserId, online: bool) -> usize {
        let mut delivered = 0;
        for connection in self.registry.all_connections() {
            if connection.user_id() == user {
                continue;
            }
            if connection
                .deliver(ServerEvent::presence(user, online))
                .is_delivered()
            {
                delivered += 1;
            }
        }
        debug!(user_id = %user, online, delivered, "Presence broadcast");
        delivered
    }

    pub async fn list_messages_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, RouterError> {
        Ok(self.store.list_messages_between(a, b).await?)
    }

    pub fn is_online(&self, user: UserId) -> bool {
        self.registry.is_online(user)
    }

    pub fn online_users(&self) -> HashSet<UserId> {
        self.registry.snapshot_online_set()
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("registry", &self.registry)
            .field("typing", &self.typing)
            .finish_non_exhaustive()
    }
}
