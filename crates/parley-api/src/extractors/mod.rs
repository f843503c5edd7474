//! Axum extractors for request handling

mod auth;
mod path;
mod validated;

pub use auth::AuthUser;
pub use path::MessageIdPath;
pub use validated::ValidatedJson;
pub(crate) use validated::json_rejection;
