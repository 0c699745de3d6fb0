// src/services/message_service.rs

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        text::{escape_angle_brackets, preview},
    },
    db::{ConversationStore, NotificationStore},
    models::{
        auth::User,
        messaging::{
            Conversation, CreateConversationPayload, MarkReadResponse, Message, NewConversation, NewMessage,
            SendMessageResponse,
        },
        notification::{NewNotification, NOTIFY_NEW_MESSAGE},
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

const PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct MessageService {
    conversations: Arc<dyn ConversationStore>,
    notifications: Arc<dyn NotificationStore>,
    feed: ChangeFeed,
}

impl MessageService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        notifications: Arc<dyn NotificationStore>,
        feed: ChangeFeed,
    ) -> Self {
        Self { conversations, notifications, feed }
    }

    async fn member_conversation(&self, conversation_id: Uuid, user_id: Uuid) -> Result<Conversation, AppError> {
        let conversation = self
            .conversations
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversa".into()))?;

        if !conversation.is_member(user_id) {
            return Err(AppError::Forbidden("Você não participa desta conversa.".into()));
        }
        Ok(conversation)
    }

    /// Relay: valida participação, sanitiza, grava e notifica os demais membros.
    pub async fn send_message(
        &self,
        sender: &User,
        conversation_id: Uuid,
        body: &str,
        attachments: Vec<Value>,
    ) -> Result<SendMessageResponse, AppError> {
        tracing::info!("Enviando mensagem para a conversa {}", conversation_id);

        let conversation = self.member_conversation(conversation_id, sender.id).await?;

        let sanitized = escape_angle_brackets(body);
        if sanitized.is_empty() {
            return Err(AppError::InvalidInput("A mensagem não pode ser vazia.".into()));
        }

        let message = self
            .conversations
            .insert_message(NewMessage {
                conversation_id,
                sender_id: sender.id,
                body: sanitized,
                attachments,
            })
            .await?;

        // Escritas sequenciais, sem transação: a mensagem já está salva
        if let Err(e) = self.conversations.touch_conversation(conversation_id).await {
            tracing::warn!("Falha ao atualizar updated_at da conversa {}: {}", conversation_id, e);
        }

        let recipients = conversation.recipients_excluding(sender.id);
        for recipient in &recipients {
            self.feed.publish(ChangeEvent::new("messages", ChangeKind::Insert, Some(*recipient), &message));
        }
        self.fan_out(&conversation, &message, &recipients).await;

        tracing::info!("✅ Mensagem enviada: {}", message.id);
        Ok(SendMessageResponse { success: true, message })
    }

    async fn fan_out(&self, conversation: &Conversation, message: &Message, recipients: &[Uuid]) {
        let body = preview(&message.body, PREVIEW_CHARS);
        let link = format!("/messages?conversation={}", conversation.id);

        for recipient in recipients {
            let notification = NewNotification::new(*recipient, NOTIFY_NEW_MESSAGE, "New Message")
                .with_body(body.clone())
                .with_link(link.clone());

            match self.notifications.insert_notification(notification).await {
                Ok(row) => self
                    .feed
                    .publish(ChangeEvent::new("notifications", ChangeKind::Insert, Some(*recipient), &row)),
                Err(e) => tracing::warn!("Falha ao notificar {}: {}", recipient, e),
            }
        }
    }

    pub async fn create_conversation(
        &self,
        creator: &User,
        payload: CreateConversationPayload,
    ) -> Result<Conversation, AppError> {
        let mut participant_ids: Vec<Uuid> = Vec::with_capacity(payload.participant_ids.len());
        for id in payload.participant_ids {
            if id != creator.id && !participant_ids.contains(&id) {
                participant_ids.push(id);
            }
        }
        if participant_ids.is_empty() {
            return Err(AppError::InvalidInput("Informe ao menos um participante além de você.".into()));
        }

        let conversation = self
            .conversations
            .create_conversation(NewConversation {
                created_by: creator.id,
                property_id: payload.property_id,
                title: payload.title.map(|t| escape_angle_brackets(&t)).filter(|t| !t.is_empty()),
                participant_ids,
            })
            .await?;

        Ok(conversation)
    }

    pub async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        self.conversations.list_for_member(user_id).await
    }

    pub async fn list_messages(&self, user_id: Uuid, conversation_id: Uuid) -> Result<Vec<Message>, AppError> {
        self.member_conversation(conversation_id, user_id).await?;
        self.conversations.list_messages(conversation_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, conversation_id: Uuid) -> Result<MarkReadResponse, AppError> {
        self.member_conversation(conversation_id, user_id).await?;
        let updated = self.conversations.mark_read(conversation_id, user_id).await?;
        Ok(MarkReadResponse { updated })
    }
}
