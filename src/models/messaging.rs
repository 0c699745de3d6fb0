// src/models/messaging.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub created_by: Uuid,
    pub property_id: Option<Uuid>,
    pub title: Option<String>,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    // O criador é participante implícito
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.created_by == user_id || self.participant_ids.contains(&user_id)
    }

    // Todos os membros menos `sender`, sem repetição, criador primeiro
    pub fn recipients_excluding(&self, sender: Uuid) -> Vec<Uuid> {
        let mut out = Vec::with_capacity(self.participant_ids.len() + 1);
        for id in std::iter::once(self.created_by).chain(self.participant_ids.iter().copied()) {
            if id != sender && !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachments: sqlx::types::Json<Vec<Value>>, // Opaco
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachments: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub created_by: Uuid,
    pub property_id: Option<Uuid>,
    pub title: Option<String>,
    pub participant_ids: Vec<Uuid>,
}

// POST /api/messages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub conversation_id: Uuid,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

// POST /api/conversations/{id}/messages
#[derive(Debug, Deserialize)]
pub struct PostMessagePayload {
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: Message,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationPayload {
    #[validate(length(max = 200, message = "O título deve ter no máximo 200 caracteres."))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Informe ao menos um participante."))]
    pub participant_ids: Vec<Uuid>,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub updated: u64,
}
