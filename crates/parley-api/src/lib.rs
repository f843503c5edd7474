//! # parley-api
//!
//! HTTP host for the messaging core: the REST surface under `/api/v1`, the
//! health probe, and the `/gateway` WebSocket endpoint from `parley-gateway`,
//! all served by one Axum application over one shared presence registry.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
