//! Repository traits

mod repositories;

pub use repositories::{MessageRepository, ReadTransition, RepoResult, UserRepository};
