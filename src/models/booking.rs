// src/models/booking.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub visit_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Reserva + resumo do imóvel (lista "Minhas visitas")
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithProperty {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub property_title: String,
    pub property_city: String,
    pub property_price: Decimal,
}

// O que o checkout precisa saber da reserva
#[derive(Debug, Clone, FromRow)]
pub struct BookingCheckoutInfo {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub property_title: String,
}

// Nova reserva (entrada do repositório)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub visit_date: DateTime<Utc>,
    pub notes: Option<String>,
}

// POST /api/bookings/visit
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookVisitPayload {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub visit_date: DateTime<Utc>,
    #[validate(length(max = 2000, message = "As observações devem ter no máximo 2000 caracteres."))]
    pub notes: Option<String>,
    #[validate(email(message = "O e-mail do visitante é inválido."))]
    pub user_email: String,
    pub user_name: Option<String>,
    #[validate(length(min = 1, message = "O título do imóvel é obrigatório."))]
    pub property_title: String,
    #[validate(email(message = "O e-mail do proprietário é inválido."))]
    pub owner_email: Option<String>,
    pub owner_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookVisitResponse {
    pub success: bool,
    pub booking: Booking,
}
