//! Server-side typing indicators

mod coordinator;

pub use coordinator::{TypingCoordinator, DEFAULT_TYPING_TIMEOUT};
