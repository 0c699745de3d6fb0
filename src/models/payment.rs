// src/models/payment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// pending -> succeeded | failed (estados terminais)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Linha `pending` gravada após a criação da sessão no provedor
#[derive(Debug, Clone)]
pub struct NewPendingPayment {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub stripe_session_id: String,
}

// Resultado da transição disparada por "checkout.session.completed"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    // pending/failed -> succeeded nesta entrega
    Transitioned,
    // Reentrega: o pagamento já estava `succeeded`
    AlreadySucceeded,
    // Nenhum pagamento com este session id
    NoMatch,
}

// POST /api/payments/checkout
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(length(min = 1, message = "O bookingId é obrigatório."))]
    pub booking_id: String,
    // Valor em rúpias inteiras; convertido para paise (x100) no provedor
    #[validate(range(min = 1, message = "O valor deve ser positivo."))]
    pub amount: i64,
    #[validate(length(equal = 3, message = "A moeda deve ter 3 letras (ISO 4217)."))]
    pub currency: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
}
