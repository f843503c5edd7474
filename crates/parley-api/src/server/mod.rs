//! Server setup and initialization

use std::sync::Arc;

use axum::Router;
use parley_common::{AppConfig, AppError, CredentialVerifier, JwtService};
use parley_core::SnowflakeGenerator;
use parley_gateway::GatewayState;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware(
        create_router(),
        &config.cors,
        config.app.env.is_production(),
    );
    router.with_state(state)
}

/// Open the store and wire the gateway, credential services and id generator
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let repos = parley_store::open(&config.storage)
        .await
        .map_err(|e| AppError::Config(e.to_string()))?;

    let jwt = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let verifier: Arc<dyn CredentialVerifier> = jwt.clone();

    // Users and messages draw from one generator so ids never collide
    let ids = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let gateway = GatewayState::build(
        repos.messages,
        verifier,
        Arc::clone(&ids),
        config.gateway.clone(),
    );

    Ok(AppState::new(repos.users, gateway, jwt, ids, config))
}

/// Serve `app` on an already-bound listener until ctrl-c
pub async fn run_server(listener: TcpListener, app: Router) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Listener has no local address: {e}")))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.address();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let state = create_app_state(config).await?;
    run_server(listener, create_app(state)).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received ctrl-c, shutting down");
    } else {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}
