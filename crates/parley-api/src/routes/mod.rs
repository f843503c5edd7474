//! Route definitions
//!
//! REST endpoints live under /api/v1; the WebSocket gateway and the health
//! probe sit at the root.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, health, messages, users};
use crate::state::AppState;

/// All routes, before middleware and state are applied
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(health_routes())
        .merge(parley_gateway::create_router::<AppState>())
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(message_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_contacts))
        .route("/users/@me", get(users::get_current_user))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/messages/:message_id/read", put(messages::mark_read))
}
