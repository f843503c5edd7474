//! Op code handlers
//!
//! Turns decoded client frames into session calls and answers them on the
//! same connection.

mod error;
mod heartbeat;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;

use crate::connection::{Connection, Delivery};
use crate::events::{MarkReadAckEvent, MessageAckEvent, MessagePayload, ServerEvent};
use crate::protocol::{GatewayMessage, MarkReadPayload, OpCode, SendMessagePayload, TypingPayload};
use crate::router::{OutgoingMessage, RouterError};
use crate::session::Session;

/// Routes client frames to their handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle one client frame
    ///
    /// `Err` means the connection must close with the error's close code.
    pub async fn dispatch(session: &Session, message: GatewayMessage) -> HandlerResult<()> {
        let connection = session.connection().ok_or(HandlerError::NotAuthenticated)?;

        tracing::trace!(
            session_id = %session.id(),
            op = %message.op,
            "Received frame"
        );

        match message.op {
            OpCode::Heartbeat => HeartbeatHandler::handle(connection),
            OpCode::SendMessage => {
                let payload: SendMessagePayload = match message.payload() {
                    Ok(payload) => payload,
                    Err(e) => return Self::reject_payload(session, connection, &message, &e).await,
                };
                let nonce = payload.nonce;
                let outgoing = OutgoingMessage {
                    receiver_id: payload.receiver_id,
                    content: payload.content,
                    attachment_url: payload.file_url,
                    is_group: payload.is_group_message,
                };
                let reply = match session.send_message(outgoing).await {
                    Ok(stored) => ServerEvent::MessageAck(MessageAckEvent {
                        nonce,
                        message: MessagePayload::from(stored),
                    }),
                    Err(e) => Self::rejection(session, &e, nonce),
                };
                Self::reply(connection, reply).await
            }
            OpCode::MarkRead => {
                let payload: MarkReadPayload = match message.payload() {
                    Ok(payload) => payload,
                    Err(e) => return Self::reject_payload(session, connection, &message, &e).await,
                };
                let reply = match session.mark_read(payload.message_id).await {
                    Ok(_) => ServerEvent::MarkReadAck(MarkReadAckEvent {
                        nonce: payload.nonce,
                        message_id: payload.message_id,
                    }),
                    Err(e) => Self::rejection(session, &e, payload.nonce),
                };
                Self::reply(connection, reply).await
            }
            OpCode::TypingStart | OpCode::TypingStop => {
                let payload: TypingPayload = match message.payload() {
                    Ok(payload) => payload,
                    Err(e) => return Self::reject_payload(session, connection, &message, &e).await,
                };
                let is_typing = message.op == OpCode::TypingStart;
                match session.set_typing(payload.receiver_id, is_typing) {
                    Ok(()) => Ok(()),
                    Err(e) => Self::reply(connection, Self::rejection(session, &e, None)).await,
                }
            }
            OpCode::Dispatch | OpCode::Hello | OpCode::HeartbeatAck => {
                tracing::warn!(
                    session_id = %session.id(),
                    op = %message.op,
                    "Received server-only op code from client"
                );
                Err(HandlerError::UnknownOpcode(message.op.as_u8()))
            }
        }
    }

    /// Answer the submitting connection, waiting for room in its queue
    async fn reply(connection: &Connection, event: ServerEvent) -> HandlerResult<()> {
        match connection.reply(event).await {
            Delivery::Closed => Err(HandlerError::ConnectionClosed),
            _ => Ok(()),
        }
    }

    /// A well-formed frame whose `d` does not fit its op is a bad request,
    /// not a protocol error
    async fn reject_payload(
        session: &Session,
        connection: &Connection,
        message: &GatewayMessage,
        error: &serde_json::Error,
    ) -> HandlerResult<()> {
        let error = RouterError::InvalidRequest(format!("invalid op {} payload: {error}", message.op));
        Self::reply(connection, Self::rejection(session, &error, message.nonce())).await
    }

    fn rejection(session: &Session, error: &RouterError, nonce: Option<String>) -> ServerEvent {
        tracing::debug!(
            session_id = %session.id(),
            code = error.code(),
            error = %error,
            "Request rejected"
        );
        ServerEvent::RequestRejected(error.to_rejection(nonce))
    }
}
