//! Request-scoped services over [`AppState`](crate::state::AppState)

mod auth;
mod user;

pub use auth::AuthService;
pub use user::UserService;
