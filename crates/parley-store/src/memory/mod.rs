//! In-memory store
//!
//! A single [`InMemoryStore`] implements both repository traits so that a
//! message insert can check its participants the way the Postgres foreign keys
//! do. Contents are lost when the process exits.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use parley_core::{
    DomainError, Message, MessageId, MessageRepository, ReadTransition, RepoResult, User, UserId,
    UserRepository,
};

struct StoredUser {
    user: User,
    password_hash: String,
}

/// DashMap-backed users and messages
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<UserId, StoredUser>,
    emails: DashMap<String, UserId>,
    messages: DashMap<MessageId, Message>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("users", &self.users.len())
            .field("messages", &self.messages.len())
            .finish()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|id| *id) else {
            return Ok(None);
        };
        UserRepository::find_by_id(self, id).await
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.emails.contains_key(&email.to_lowercase()))
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        // The email entry is the uniqueness lock; the user row goes in while it is held
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => Err(DomainError::EmailAlreadyExists),
            Entry::Vacant(slot) => {
                self.users.insert(
                    user.id,
                    StoredUser {
                        user: user.clone(),
                        password_hash: password_hash.to_string(),
                    },
                );
                slot.insert(user.id);
                Ok(())
            }
        }
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .users
            .get(&id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn list_all(&self) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.user.clone()).collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        for participant in [message.sender_id, message.receiver_id] {
            if !self.users.contains_key(&participant) {
                return Err(DomainError::UserNotFound(participant));
            }
        }

        match self.messages.entry(message.id) {
            Entry::Occupied(_) => Err(DomainError::InternalError(format!(
                "duplicate message id {}",
                message.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(message.clone());
                Ok(())
            }
        }
    }

    async fn mark_read(&self, id: MessageId) -> RepoResult<Option<ReadTransition>> {
        // The shard write lock makes check-and-set atomic per message
        Ok(self.messages.get_mut(&id).map(|mut entry| {
            let transitioned = entry.mark_read();
            ReadTransition {
                message: entry.clone(),
                transitioned,
            }
        }))
    }

    async fn list_between(&self, user_a: UserId, user_b: UserId) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.involves(user_a) && m.peer_of(user_a) == Some(user_b))
            .map(|m| m.clone())
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}
