//! Gateway frame format

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CloseCode, HelloPayload, OpCode};

/// Every frame on the socket, in both directions, has this shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            op: OpCode::Hello,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck,
            t: None,
            s: None,
            d: None,
        }
    }

    /// Decode `d` into a client payload
    ///
    /// A missing `d` decodes as JSON `null`, so payloads with required
    /// fields fail here rather than later.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.d.clone().unwrap_or(Value::Null))
    }

    /// The client's `nonce`, read on its own so it can be echoed even when
    /// the rest of `d` is malformed
    #[must_use]
    pub fn nonce(&self) -> Option<String> {
        self.d.as_ref()?.get("nonce")?.as_str().map(str::to_owned)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode a client frame, classifying failures as close codes
    ///
    /// Well-formed JSON whose `op` is unknown or server-only is
    /// `UnknownOpcode`; anything else that fails is `DecodeError`.
    pub fn decode_client(text: &str) -> Result<Self, CloseCode> {
        match Self::from_json(text) {
            Ok(msg) if msg.op.is_client_op() => Ok(msg),
            Ok(_) => Err(CloseCode::UnknownOpcode),
            Err(_) => {
                let has_numeric_op = serde_json::from_str::<Value>(text)
                    .ok()
                    .and_then(|v| v.get("op").and_then(Value::as_u64))
                    .is_some();
                if has_numeric_op {
                    Err(CloseCode::UnknownOpcode)
                } else {
                    Err(CloseCode::DecodeError)
                }
            }
        }
    }

    /// Code and reason for a WebSocket close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, &'static str) {
        (code.as_u16(), code.description())
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
