//! Application state
//!
//! Holds the user store, the gateway (and with it the one presence registry
//! both transports share), credential services and configuration.

use std::sync::Arc;

use axum::extract::FromRef;
use parley_common::{AppConfig, JwtService, PasswordService};
use parley_core::{SnowflakeGenerator, UserRepository};
use parley_gateway::{EventRouter, GatewayState};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    users: Arc<dyn UserRepository>,
    gateway: GatewayState,
    jwt: Arc<JwtService>,
    passwords: PasswordService,
    ids: Arc<SnowflakeGenerator>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        gateway: GatewayState,
        jwt: Arc<JwtService>,
        ids: Arc<SnowflakeGenerator>,
        config: AppConfig,
    ) -> Self {
        Self {
            users,
            gateway,
            jwt,
            passwords: PasswordService::new(),
            ids,
            config: Arc::new(config),
        }
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    pub fn gateway(&self) -> &GatewayState {
        &self.gateway
    }

    /// The event router behind both REST and WebSocket requests
    pub fn router(&self) -> &Arc<EventRouter> {
        self.gateway.router()
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt
    }

    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    pub fn ids(&self) -> &SnowflakeGenerator {
        &self.ids
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl FromRef<AppState> for GatewayState {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway)
            .field("jwt", &self.jwt)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
