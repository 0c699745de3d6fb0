// src/db/booking_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::booking::{Booking, BookingCheckoutInfo, BookingStatus, BookingWithProperty, NewBooking},
};

/// Acesso às reservas usado pelos fluxos de visita, checkout e webhook.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError>;

    async fn find_for_checkout(&self, booking_id: Uuid) -> Result<Option<BookingCheckoutInfo>, AppError>;

    /// "Seta o campo para X": reaplicar o mesmo status é inofensivo.
    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<Option<Booking>, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError>;

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError>;

    async fn find_for_user(&self, booking_id: Uuid, user_id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Remove (hard delete) apenas se ainda estiver `pending`.
    async fn delete_pending(&self, booking_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_WITH_PROPERTY: &str = r#"
    SELECT b.*, p.title AS property_title, p.city AS property_city, p.price AS property_price
    FROM bookings b
    JOIN properties p ON p.id = b.property_id
"#;

#[async_trait]
impl BookingStore for BookingRepository {
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (property_id, user_id, visit_date, notes, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            "#,
        )
        .bind(new.property_id)
        .bind(new.user_id)
        .bind(new.visit_date)
        .bind(new.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // FK inválida = imóvel inexistente
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Imóvel".into());
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(booking)
    }

    async fn find_for_checkout(&self, booking_id: Uuid) -> Result<Option<BookingCheckoutInfo>, AppError> {
        let info = sqlx::query_as::<_, BookingCheckoutInfo>(
            r#"
            SELECT b.id AS booking_id, b.user_id, b.status, p.title AS property_title
            FROM bookings b
            JOIN properties p ON p.id = b.property_id
            WHERE b.id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(info)
    }

    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        let query = format!("{} WHERE b.user_id = $1 ORDER BY b.visit_date DESC", BOOKING_WITH_PROPERTY);
        let bookings = sqlx::query_as::<_, BookingWithProperty>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<BookingWithProperty>, AppError> {
        let query = format!("{} WHERE p.owner_id = $1 ORDER BY b.visit_date DESC", BOOKING_WITH_PROPERTY);
        let bookings = sqlx::query_as::<_, BookingWithProperty>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    async fn find_for_user(&self, booking_id: Uuid, user_id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND user_id = $2",
        )
        .bind(booking_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn delete_pending(&self, booking_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM bookings WHERE id = $1 AND user_id = $2 AND status = 'pending'",
        )
        .bind(booking_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
