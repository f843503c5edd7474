//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use parley_core::{Message, MessageId, MessageRepository, ReadTransition, RepoResult, UserId};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::{map_db_error, map_missing_participant};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, receiver_id, content, created_at, is_read, attachment_url, is_group
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let row = MessageInsert::new(message);

        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, receiver_id, content, created_at, is_read, attachment_url, is_group)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            ",
        )
        .bind(row.id)
        .bind(row.sender_id)
        .bind(row.receiver_id)
        .bind(row.content)
        .bind(message.created_at)
        .bind(row.attachment_url)
        .bind(row.is_group)
        .execute(&self.pool)
        .await
        .map_err(|e| map_missing_participant(e, message.sender_id, message.receiver_id))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: MessageId) -> RepoResult<Option<ReadTransition>> {
        // Row lock on UPDATE serializes concurrent callers; only one sees is_read = FALSE
        let updated = sqlx::query_as::<_, MessageModel>(
            r"
            UPDATE messages
            SET is_read = TRUE
            WHERE id = $1 AND is_read = FALSE
            RETURNING id, sender_id, receiver_id, content, created_at, is_read, attachment_url, is_group
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(model) = updated {
            return Ok(Some(ReadTransition {
                message: Message::from(model),
                transitioned: true,
            }));
        }

        debug!("Message already read or missing");
        Ok(self.find_by_id(id).await?.map(|message| ReadTransition {
            message,
            transitioned: false,
        }))
    }

    #[instrument(skip(self))]
    async fn list_between(&self, user_a: UserId, user_b: UserId) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, receiver_id, content, created_at, is_read, attachment_url, is_group
            FROM messages
            WHERE LEAST(sender_id, receiver_id) = LEAST($1, $2)
              AND GREATEST(sender_id, receiver_id) = GREATEST($1, $2)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Message::from).collect())
    }
}
