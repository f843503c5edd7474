//! Heartbeat handler (op 1)

use super::{HandlerError, HandlerResult};
use crate::connection::{Connection, Delivery};
use crate::protocol::GatewayMessage;

pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Refresh the connection's liveness and acknowledge
    pub fn handle(connection: &Connection) -> HandlerResult<()> {
        connection.record_heartbeat();

        tracing::trace!(
            session_id = %connection.session_id(),
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        match connection.send_frame(GatewayMessage::heartbeat_ack()) {
            Delivery::Closed => Err(HandlerError::ConnectionClosed),
            Delivery::Dropped => {
                tracing::warn!(
                    session_id = %connection.session_id(),
                    "Outbound queue full, heartbeat ack dropped"
                );
                Ok(())
            }
            Delivery::Delivered | Delivery::Offline => Ok(()),
        }
    }
}
