// src/db/payment_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::payment::{NewPendingPayment, Payment, PaymentStatus, SessionTransition},
};

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_pending(&self, new: NewPendingPayment) -> Result<Payment, AppError>;

    /// Marca como `succeeded` o pagamento da sessão e anexa o payment intent.
    async fn complete_session(
        &self,
        session_id: &str,
        payment_intent: Option<&str>,
    ) -> Result<SessionTransition, AppError>;

    /// Eventos de payment intent não trazem o session id: a chave é o intent.
    async fn set_status_by_intent(&self, payment_intent: &str, status: PaymentStatus) -> Result<u64, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>, AppError>;
}

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn insert_pending(&self, new: NewPendingPayment) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (booking_id, user_id, amount, currency, status, stripe_session_id)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING *
            "#,
        )
        .bind(new.booking_id)
        .bind(new.user_id)
        .bind(new.amount)
        .bind(&new.currency)
        .bind(&new.stripe_session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn complete_session(
        &self,
        session_id: &str,
        payment_intent: Option<&str>,
    ) -> Result<SessionTransition, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava as linhas da sessão para ler o status anterior e atualizar de forma atômica
        let previous = sqlx::query_scalar::<_, PaymentStatus>(
            "SELECT status FROM payments WHERE stripe_session_id = $1 FOR UPDATE",
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        if previous.is_empty() {
            tx.commit().await?;
            return Ok(SessionTransition::NoMatch);
        }

        sqlx::query(
            r#"
            UPDATE payments
            SET status = 'succeeded',
                stripe_payment_intent = COALESCE($2, stripe_payment_intent)
            WHERE stripe_session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(payment_intent)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if previous.iter().all(|s| *s == PaymentStatus::Succeeded) {
            Ok(SessionTransition::AlreadySucceeded)
        } else {
            Ok(SessionTransition::Transitioned)
        }
    }

    async fn set_status_by_intent(&self, payment_intent: &str, status: PaymentStatus) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE payments SET status = $2 WHERE stripe_payment_intent = $1")
            .bind(payment_intent)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
