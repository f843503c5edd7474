//! Event routing between sessions

mod error;
mod router;

pub use error::RouterError;
pub use router::{EventRouter, OutgoingMessage};
