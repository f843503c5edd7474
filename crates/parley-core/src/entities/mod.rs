//! Domain entities - core business objects

mod message;
mod user;

pub use message::{Message, NewMessage, MAX_CONTENT_LENGTH};
pub use user::{Contact, User};
