// src/db/conversation_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::messaging::{Conversation, Message, NewConversation, NewMessage},
};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, new: NewConversation) -> Result<Conversation, AppError>;

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>, AppError>;

    /// Conversas criadas pelo usuário ou em que ele participa, mais recentes primeiro.
    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError>;

    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError>;

    async fn touch_conversation(&self, conversation_id: Uuid) -> Result<(), AppError>;

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// Marca como lidas as mensagens recebidas (não enviadas por `reader_id`).
    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn create_conversation(&self, new: NewConversation) -> Result<Conversation, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (created_by, property_id, title, participant_ids)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.created_by)
        .bind(new.property_id)
        .bind(&new.title)
        .bind(&new.participant_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conversation)
    }

    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE created_by = $1 OR $1 = ANY(participant_ids)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, body, attachments)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.conversation_id)
        .bind(new.sender_id)
        .bind(&new.body)
        .bind(sqlx::types::Json(&new.attachments))
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn touch_conversation(&self, conversation_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET is_read = true
            WHERE conversation_id = $1 AND sender_id <> $2 AND is_read = false
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
