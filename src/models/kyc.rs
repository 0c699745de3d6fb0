// src/models/kyc.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KycVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: String,
    pub document_number: String,
    pub document_url: Option<String>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Fila do admin: documento + quem enviou
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingKyc {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub verification: KycVerification,
    pub user_email: String,
    pub user_full_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitKycPayload {
    #[validate(length(min = 2, max = 50, message = "Tipo de documento inválido."))]
    pub document_type: String,
    #[validate(length(min = 4, max = 50, message = "Número de documento inválido."))]
    pub document_number: String,
    #[validate(url(message = "A URL do documento é inválida."))]
    pub document_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectKycPayload {
    pub notes: Option<String>,
}
