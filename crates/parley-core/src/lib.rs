//! # parley-core
//!
//! Domain layer for one-to-one messaging: identifiers, users, messages, and the
//! store traits the real-time core is written against.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Contact, Message, NewMessage, User, MAX_CONTENT_LENGTH};
pub use error::DomainError;
pub use traits::{MessageRepository, ReadTransition, RepoResult, UserRepository};
pub use value_objects::{MessageId, Snowflake, SnowflakeGenerator, SnowflakeParseError, UserId};
