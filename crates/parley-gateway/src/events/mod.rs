//! Dispatch events the server pushes to clients

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    MarkReadAckEvent, MessageAckEvent, MessagePayload, MessageReadEvent, PresenceEvent,
    ReadyEvent, RequestRejectedEvent, ServerEvent, TypingIndicatorEvent,
};
