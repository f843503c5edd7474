//! WebSocket handler
//!
//! One receive loop per connection processes frames in order. A spawned send
//! task drains the outbound queue and a spawned monitor enforces heartbeats.
//! Whichever notices the end first records a close code on the connection;
//! the session then closes exactly once.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::connection::{Connection, Outbound};
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use crate::session::Session;

/// Missed heartbeat intervals tolerated before the session times out
const HEARTBEAT_GRACE_FACTOR: u32 = 2;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    token: Option<String>,
}

/// WebSocket gateway handler
///
/// The upgrade always succeeds; the credential is checked by the session so
/// that a rejection arrives as close code 4004 rather than an HTTP error.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let credential = handshake_credential(&headers, query.token);
    ws.on_upgrade(move |socket| handle_socket(state, socket, credential))
}

/// `Authorization` header first, then the `token` query parameter
fn handshake_credential(headers: &HeaderMap, query_token: Option<String>) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or(query_token)
}

async fn handle_socket(state: GatewayState, socket: WebSocket, credential: Option<String>) {
    let config = state.config();
    let mut session = Session::new(
        Arc::clone(state.router()),
        Arc::clone(state.verifier()),
        config.outbound_buffer,
    );
    let (mut ws_sink, mut ws_stream) = socket.split();

    let hello = GatewayMessage::hello(HelloPayload::with_interval(config.heartbeat_interval_ms));
    if send_json(&mut ws_sink, &hello).await.is_err() {
        tracing::warn!(session_id = %session.id(), "Failed to send Hello message");
        return;
    }

    let outbound = match session.authenticate(credential.as_deref()) {
        Ok(outbound) => outbound,
        Err(e) => {
            tracing::info!(session_id = %session.id(), error = %e, "Closing unauthenticated connection");
            let _ = ws_sink
                .send(close_message(CloseCode::AuthenticationFailed))
                .await;
            return;
        }
    };
    let Some(connection) = session.connection().cloned() else {
        return;
    };

    tracing::info!(
        session_id = %session.id(),
        user_id = %connection.user_id(),
        "WebSocket connection established"
    );

    let send_task = tokio::spawn(write_loop(ws_sink, outbound, Arc::clone(&connection)));
    let heartbeat_task = tokio::spawn(monitor_heartbeat(
        Arc::clone(&connection),
        config.heartbeat_interval(),
    ));

    let code = read_loop(&session, &mut ws_stream, &connection).await;
    tracing::debug!(session_id = %session.id(), close_code = %code, "Receive loop ended");

    session.close(code);
    heartbeat_task.abort();
    if let Err(e) = send_task.await {
        tracing::warn!(session_id = %session.id(), error = %e, "Send task failed");
    }
}

/// Process frames until the client leaves, a frame is fatal, or someone
/// else requests a close
async fn read_loop(
    session: &Session,
    stream: &mut SplitStream<WebSocket>,
    connection: &Connection,
) -> CloseCode {
    let mut closed = connection.closed();

    loop {
        tokio::select! {
            // The watch guard is !Send; copy the reason out before the branch ends
            requested = async {
                closed.wait_for(Option::is_some).await.ok().and_then(|reason| *reason)
            } => {
                return requested.unwrap_or(CloseCode::UnknownError);
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let message = match GatewayMessage::decode_client(&text) {
                        Ok(message) => message,
                        Err(code) => {
                            tracing::debug!(session_id = %session.id(), close_code = %code, "Undecodable frame");
                            return code;
                        }
                    };
                    if let Err(e) = MessageDispatcher::dispatch(session, message).await {
                        tracing::warn!(session_id = %session.id(), error = %e, "Handler error");
                        return e.to_close_code();
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!(session_id = %session.id(), "Binary messages not supported");
                    return CloseCode::DecodeError;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(session_id = %session.id(), "Ping/pong");
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(session_id = %session.id(), "Client closed connection");
                    return CloseCode::Normal;
                }
                Some(Err(e)) => {
                    tracing::warn!(session_id = %session.id(), error = %e, "WebSocket error");
                    return CloseCode::UnknownError;
                }
            }
        }
    }
}

/// Drain the outbound queue onto the socket, then send the close frame
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Outbound>,
    connection: Arc<Connection>,
) {
    let mut closed = connection.closed();

    loop {
        tokio::select! {
            biased;
            item = outbound.recv() => {
                let Some(item) = item else { break };
                let frame = match item {
                    Outbound::Event(event) => event.into_dispatch(connection.next_sequence()),
                    Outbound::Frame(frame) => Ok(frame),
                };
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(session_id = %connection.session_id(), error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if send_json(&mut sink, &frame).await.is_err() {
                    tracing::warn!(
                        session_id = %connection.session_id(),
                        "Failed to send message to WebSocket"
                    );
                    connection.close(CloseCode::UnknownError);
                    break;
                }
            }
            () = async { let _ = closed.wait_for(Option::is_some).await; } => break,
        }
    }

    let code = connection.close_reason().unwrap_or(CloseCode::Normal);
    let _ = sink.send(close_message(code)).await;
    let _ = sink.close().await;
}

/// Close the connection once the client has been silent for too long
async fn monitor_heartbeat(connection: Arc<Connection>, heartbeat_interval: Duration) {
    let timeout = heartbeat_interval * HEARTBEAT_GRACE_FACTOR;
    let mut check_interval =
        tokio::time::interval((heartbeat_interval / 2).max(Duration::from_millis(1)));

    loop {
        check_interval.tick().await;
        if connection.is_closed() {
            break;
        }

        let time_since = connection.time_since_heartbeat();
        if time_since > timeout {
            tracing::warn!(
                session_id = %connection.session_id(),
                time_since_ms = time_since.as_millis(),
                "Connection timed out (no heartbeat)"
            );
            connection.close(CloseCode::SessionTimeout);
            break;
        }
    }
}

async fn send_json(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &GatewayMessage,
) -> Result<(), axum::Error> {
    match frame.to_json() {
        Ok(json) => sink.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!(error = %e, frame = %frame, "Failed to encode frame");
            Ok(())
        }
    }
}

fn close_message(code: CloseCode) -> Message {
    Message::Close(Some(CloseFrame {
        code: code.as_u16(),
        reason: Cow::Borrowed(code.description()),
    }))
}
