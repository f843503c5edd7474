//! Gateway server setup

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::extract::FromRef;
use axum::{routing::get, Router};

/// The WebSocket route, mountable in any router whose state can hand out a
/// [`GatewayState`]
pub fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    GatewayState: FromRef<S>,
{
    Router::new().route("/gateway", get(gateway_handler))
}
