//! Presence registry

mod presence;

pub use presence::PresenceRegistry;
