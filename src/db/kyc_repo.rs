// src/db/kyc_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::kyc::{KycVerification, PendingKyc},
};

#[derive(Clone)]
pub struct KycRepository {
    pool: PgPool,
}

impl KycRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        document_type: &str,
        document_number: &str,
        document_url: Option<&str>,
    ) -> Result<KycVerification, AppError> {
        let verification = sqlx::query_as::<_, KycVerification>(
            r#"
            INSERT INTO kyc_verifications (user_id, document_type, document_number, document_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(document_type)
        .bind(document_number)
        .bind(document_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(verification)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<KycVerification>, AppError> {
        let rows = sqlx::query_as::<_, KycVerification>(
            "SELECT * FROM kyc_verifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fila de revisão do admin (somente não verificados, mais antigos primeiro).
    pub async fn list_pending(&self) -> Result<Vec<PendingKyc>, AppError> {
        let rows = sqlx::query_as::<_, PendingKyc>(
            r#"
            SELECT k.*, u.email AS user_email, u.full_name AS user_full_name
            FROM kyc_verifications k
            JOIN users u ON u.id = k.user_id
            WHERE k.verified = false
            ORDER BY k.created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn approve(&self, kyc_id: Uuid) -> Result<Option<KycVerification>, AppError> {
        let row = sqlx::query_as::<_, KycVerification>(
            r#"
            UPDATE kyc_verifications
            SET verified = true, verified_at = now(), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(kyc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Rejeição remove o registro; o usuário precisa reenviar.
    pub async fn delete(&self, kyc_id: Uuid) -> Result<Option<KycVerification>, AppError> {
        let row = sqlx::query_as::<_, KycVerification>(
            "DELETE FROM kyc_verifications WHERE id = $1 RETURNING *",
        )
        .bind(kyc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
