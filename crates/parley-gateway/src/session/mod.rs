//! Per-connection session lifecycle

mod session;

pub use session::{Session, SessionState};
