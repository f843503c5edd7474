//! Gateway state

use std::sync::Arc;

use parley_common::{CredentialVerifier, GatewayConfig};
use parley_core::{MessageRepository, SnowflakeGenerator};

use crate::registry::PresenceRegistry;
use crate::router::EventRouter;
use crate::store::MessageStoreAdapter;
use crate::typing::TypingCoordinator;

/// Everything a WebSocket connection needs, cheap to clone
#[derive(Clone)]
pub struct GatewayState {
    router: Arc<EventRouter>,
    verifier: Arc<dyn CredentialVerifier>,
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(
        router: Arc<EventRouter>,
        verifier: Arc<dyn CredentialVerifier>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            router,
            verifier,
            config: Arc::new(config),
        }
    }

    /// Wire registry, typing coordinator, store adapter and router together
    pub fn build(
        messages: Arc<dyn MessageRepository>,
        verifier: Arc<dyn CredentialVerifier>,
        ids: Arc<SnowflakeGenerator>,
        config: GatewayConfig,
    ) -> Self {
        let registry = PresenceRegistry::new_shared();
        let typing = TypingCoordinator::new(Arc::clone(&registry), config.typing_timeout());
        let store = Arc::new(MessageStoreAdapter::new(messages, ids));
        let router = Arc::new(EventRouter::new(registry, store, typing));
        Self::new(router, verifier, config)
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn verifier(&self) -> &Arc<dyn CredentialVerifier> {
        &self.verifier
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
