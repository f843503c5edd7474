//! Message entity <-> model mapper

use parley_core::{Message, Snowflake};

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            content: model.content,
            created_at: model.created_at,
            is_read: model.is_read,
            attachment_url: model.attachment_url,
            is_group: model.is_group,
        }
    }
}

/// Borrowed column values for inserting a message
pub struct MessageInsert<'a> {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: &'a str,
    pub attachment_url: Option<&'a str>,
    pub is_group: bool,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            receiver_id: message.receiver_id.into_inner(),
            content: &message.content,
            attachment_url: message.attachment_url.as_deref(),
            is_group: message.is_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_model_to_entity() {
        let model = MessageModel {
            id: 10,
            sender_id: 1,
            receiver_id: 2,
            content: "hi".to_string(),
            created_at: Utc::now(),
            is_read: true,
            attachment_url: None,
            is_group: false,
        };

        let message = Message::from(model);
        assert_eq!(message.id, Snowflake::new(10));
        assert_eq!(message.peer_of(Snowflake::new(1)), Some(Snowflake::new(2)));
        assert!(message.is_read);
    }
}
