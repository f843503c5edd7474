//! Connection session state machine
//!
//! ```text
//! Unauthenticated --valid credential--> Authenticated --disconnect--> Closed
//!        |                                                              ^
//!        +------------- bad credential / protocol error ----------------+
//! ```
//!
//! Closed is terminal. Leaving Authenticated runs the offline side effects
//! exactly once, whichever way the connection ends; [`Drop`] covers the
//! paths that never reach an explicit [`Session::close`].

use std::sync::Arc;

use parley_common::{CredentialVerifier, VerificationError};
use parley_core::{Message, MessageId, UserId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::{Connection, Outbound};
use crate::events::{ReadyEvent, ServerEvent};
use crate::protocol::CloseCode;
use crate::router::{EventRouter, OutgoingMessage, RouterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { user_id: UserId },
    Closed,
}

pub struct Session {
    session_id: String,
    state: SessionState,
    connection: Option<Arc<Connection>>,
    router: Arc<EventRouter>,
    verifier: Arc<dyn CredentialVerifier>,
    outbound_capacity: usize,
}

impl Session {
    pub fn new(
        router: Arc<EventRouter>,
        verifier: Arc<dyn CredentialVerifier>,
        outbound_capacity: usize,
    ) -> Self {
        Self {
            session_id: Self::generate_id(),
            state: SessionState::Unauthenticated,
            connection: None,
            router,
            verifier,
            outbound_capacity,
        }
    }

    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self.state {
            SessionState::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }

    pub fn connection(&self) -> Option<&Arc<Connection>> {
        self.connection.as_ref()
    }

    /// Verify the handshake credential and go online
    ///
    /// On success the connection is registered, READY is queued as its first
    /// event, and everyone else hears that the user came online. A newer
    /// connection replaces an older one for the same user; the older one is
    /// told to close with `SessionReplaced` and no second online broadcast is
    /// sent. On failure the session is Closed and nothing was registered.
    pub fn authenticate(
        &mut self,
        credential: Option<&str>,
    ) -> Result<mpsc::Receiver<Outbound>, RouterError> {
        if self.state != SessionState::Unauthenticated {
            return Err(RouterError::InvalidRequest(
                "session is past the handshake".to_string(),
            ));
        }

        let verified = credential
            .filter(|c| !c.trim().is_empty())
            .ok_or(VerificationError::Malformed)
            .and_then(|c| self.verifier.verify(c));
        let user_id = match verified {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Handshake rejected");
                self.state = SessionState::Closed;
                return Err(e.into());
            }
        };

        let (connection, outbound) =
            Connection::new(self.session_id.clone(), user_id, self.outbound_capacity);

        let registry = self.router.registry();
        let prior = {
            let _membership = registry.membership();
            let mut online_users: Vec<UserId> = registry
                .snapshot_online_set()
                .into_iter()
                .filter(|id| *id != user_id)
                .collect();
            online_users.sort_unstable();
            connection.deliver(ServerEvent::Ready(ReadyEvent {
                session_id: self.session_id.clone(),
                user_id,
                online_users,
            }));

            let prior = registry.register(Arc::clone(&connection));
            if prior.is_none() {
                self.router.broadcast_presence(user_id, true);
            }
            prior
        };

        match prior {
            Some(prior) => {
                prior.close(CloseCode::SessionReplaced);
                // Indicators from the old socket must not outlive it
                self.router.typing().clear_sender(user_id);
                info!(
                    session_id = %self.session_id,
                    user_id = %user_id,
                    replaced = %prior.session_id(),
                    "Session replaced an older connection"
                );
            }
            None => info!(session_id = %self.session_id, user_id = %user_id, "User online"),
        }

        self.connection = Some(connection);
        self.state = SessionState::Authenticated { user_id };
        Ok(outbound)
    }

    fn require_user(&self) -> Result<UserId, RouterError> {
        self.user_id().ok_or(RouterError::NotAuthenticated)
    }

    pub async fn send_message(&self, outgoing: OutgoingMessage) -> Result<Message, RouterError> {
        let sender = self.require_user()?;
        self.router.send_message(sender, outgoing).await
    }

    pub async fn mark_read(&self, message_id: MessageId) -> Result<Message, RouterError> {
        let reader = self.require_user()?;
        self.router.mark_read(reader, message_id).await
    }

    pub fn set_typing(&self, receiver: UserId, is_typing: bool) -> Result<(), RouterError> {
        let sender = self.require_user()?;
        self.router.set_typing(sender, receiver, is_typing)
    }

    /// Move to Closed, running the offline side effects if this session was
    /// the user's live connection
    ///
    /// Returns false if the session was already Closed.
    pub fn close(&mut self, code: CloseCode) -> bool {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        let SessionState::Authenticated { user_id } = previous else {
            return previous != SessionState::Closed;
        };

        let Some(connection) = self.connection.take() else {
            return true;
        };
        connection.close(code);

        let went_offline = {
            let registry = self.router.registry();
            let _membership = registry.membership();
            let removed = registry.unregister(user_id, &connection);
            if removed {
                self.router.typing().clear_sender(user_id);
                self.router.broadcast_presence(user_id, false);
            }
            removed
        };

        if went_offline {
            info!(
                session_id = %self.session_id,
                user_id = %user_id,
                close_code = %code.as_u16(),
                "User offline"
            );
        } else {
            debug!(
                session_id = %self.session_id,
                user_id = %user_id,
                "Superseded session closed, user stays online"
            );
        }
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close(CloseCode::UnknownError);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
