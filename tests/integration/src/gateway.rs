//! WebSocket gateway client

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use futures_util::{SinkExt, StreamExt};
use parley_gateway::{GatewayMessage, OpCode};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

/// How long to wait for any single frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

type ClientWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct GatewayClient {
    ws: ClientWs,
}

impl GatewayClient {
    /// Connect with the credential in the `token` query parameter
    pub async fn connect(url: &str, token: &str) -> Result<Self> {
        let (ws, _) = connect_async(format!("{url}?token={token}")).await?;
        Ok(Self { ws })
    }

    /// Next text frame decoded as a gateway message; `Err` on close or timeout
    pub async fn next_message(&mut self) -> Result<GatewayMessage> {
        loop {
            let frame = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for a frame"))?
                .ok_or_else(|| anyhow!("socket ended"))??;

            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => bail!("socket closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    pub async fn expect_hello(&mut self) -> Result<u64> {
        let message = self.next_message().await?;
        if message.op != OpCode::Hello {
            bail!("expected HELLO, got {message}");
        }
        message
            .d
            .as_ref()
            .and_then(|d| d["heartbeat_interval"].as_u64())
            .ok_or_else(|| anyhow!("HELLO without heartbeat_interval"))
    }

    /// Skip frames until a dispatch named `event` arrives; return its data
    pub async fn expect_dispatch(&mut self, event: &str) -> Result<Value> {
        loop {
            let message = self.next_message().await?;
            if message.op == OpCode::Dispatch && message.t.as_deref() == Some(event) {
                return Ok(message.d.unwrap_or(Value::Null));
            }
        }
    }

    /// Collect every dispatch named `event` that arrives within `window`
    pub async fn collect_dispatches(&mut self, event: &str, window: Duration) -> Vec<Value> {
        let mut found = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        while let Ok(Ok(message)) =
            tokio::time::timeout_at(deadline, self.next_message()).await
        {
            if message.op == OpCode::Dispatch && message.t.as_deref() == Some(event) {
                found.push(message.d.unwrap_or(Value::Null));
            }
        }
        found
    }

    pub async fn send_op(&mut self, op: OpCode, d: Value) -> Result<()> {
        let frame = json!({ "op": op.as_u8(), "d": d });
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_message(&mut self, nonce: &str, receiver_id: &str, content: &str) -> Result<()> {
        self.send_op(
            OpCode::SendMessage,
            json!({ "nonce": nonce, "receiverId": receiver_id, "content": content }),
        )
        .await
    }

    pub async fn mark_read(&mut self, nonce: &str, message_id: &str) -> Result<()> {
        self.send_op(
            OpCode::MarkRead,
            json!({ "nonce": nonce, "messageId": message_id }),
        )
        .await
    }

    /// Wait for the server's close frame and return its code
    pub async fn expect_close(&mut self) -> Result<u16> {
        loop {
            let frame = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for close"))?;

            match frame {
                Some(Ok(Message::Close(Some(close)))) => return Ok(u16::from(close.code)),
                Some(Ok(Message::Close(None))) => bail!("close frame without a code"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("socket error before close: {e}"),
                None => bail!("socket ended without a close frame"),
            }
        }
    }

    /// Client-initiated normal close
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        // Drain until the server acknowledges
        while let Ok(Some(Ok(_))) = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next()).await {}
        Ok(())
    }
}
