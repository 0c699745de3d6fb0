// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Tipos emitidos pelos serviços do servidor
pub const NOTIFY_NEW_MESSAGE: &str = "new_message";
pub const NOTIFY_PAYMENT_SUCCESS: &str = "payment_success";
pub const NOTIFY_KYC_APPROVED: &str = "kyc_approved";
pub const NOTIFY_KYC_REJECTED: &str = "kyc_rejected";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// Criada somente pelo servidor (webhook, relay de mensagens, revisão de KYC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: &str, title: &str) -> Self {
        Self {
            user_id,
            kind: kind.to_string(),
            title: title.to_string(),
            body: None,
            link: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
