//! Request DTOs
//!
//! Bodies implement `Deserialize` and `Validate`; content rules for messages
//! are enforced by the core, not here.

use parley_core::UserId;
use parley_gateway::OutgoingMessage;
use serde::Deserialize;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /messages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    pub receiver_id: UserId,
    #[serde(default, alias = "fileUrl")]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub is_group_message: bool,
}

impl From<SendMessageRequest> for OutgoingMessage {
    fn from(request: SendMessageRequest) -> Self {
        let mut outgoing = OutgoingMessage::new(request.receiver_id, request.content);
        outgoing.attachment_url = request.attachment_url;
        outgoing.is_group = request.is_group_message;
        outgoing
    }
}

/// GET /messages?with=<userId>
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub with: UserId,
}
