//! Repository traits (ports) - the durable store as seen by the domain
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! (`parley-store`) provides PostgreSQL and in-memory implementations.

use async_trait::async_trait;

use crate::entities::{Message, User};
use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Outcome of setting the read flag on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTransition {
    /// The message after the update
    pub message: Message,
    /// `true` only for the call that moved `is_read` from false to true
    pub transitioned: bool,
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by (case-insensitive) email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user; fails with `EmailAlreadyExists` on duplicates
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// All users ordered by name
    async fn list_all(&self) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>>;

    /// Insert a fully formed message (id and timestamp already assigned)
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Atomically set the read flag
    ///
    /// Returns `None` when the message does not exist. Concurrent callers on the
    /// same id observe exactly one `transitioned == true`.
    async fn mark_read(&self, id: MessageId) -> RepoResult<Option<ReadTransition>>;

    /// Conversation between two users, ascending by creation time then id
    async fn list_between(&self, user_a: UserId, user_b: UserId) -> RepoResult<Vec<Message>>;
}
