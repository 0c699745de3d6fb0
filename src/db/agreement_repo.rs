// src/db/agreement_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{agreement::{GenerateAgreementPayload, RentAgreement}, property::PropertyType},
};

// Dados do imóvel e das partes usados no PDF
#[derive(Debug, Clone, FromRow)]
pub struct AgreementParties {
    pub address: String,
    pub city: String,
    pub property_type: PropertyType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub owner_id: Uuid,
    pub landlord_name: Option<String>,
    pub tenant_name: Option<String>,
}

#[async_trait]
pub trait AgreementStore: Send + Sync {
    async fn load_parties(
        &self,
        property_id: Uuid,
        landlord_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<AgreementParties>, AppError>;

    async fn insert(
        &self,
        agreement_id: Uuid,
        payload: &GenerateAgreementPayload,
        storage_path: &str,
    ) -> Result<RentAgreement, AppError>;

    async fn find_by_id(&self, agreement_id: Uuid) -> Result<Option<RentAgreement>, AppError>;

    // Dono atual do imóvel, não o que foi gravado no contrato
    async fn property_owner(&self, property_id: Uuid) -> Result<Option<Uuid>, AppError>;
}

#[derive(Clone)]
pub struct AgreementRepository {
    pool: PgPool,
}

impl AgreementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementStore for AgreementRepository {
    async fn load_parties(
        &self,
        property_id: Uuid,
        landlord_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<AgreementParties>, AppError> {
        let parties = sqlx::query_as::<_, AgreementParties>(
            r#"
            SELECT p.address, p.city, p.property_type, p.bedrooms, p.bathrooms, p.owner_id,
                   l.full_name AS landlord_name, t.full_name AS tenant_name
            FROM properties p
            LEFT JOIN users l ON l.id = $2
            LEFT JOIN users t ON t.id = $3
            WHERE p.id = $1
            "#,
        )
        .bind(property_id)
        .bind(landlord_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(parties)
    }

    async fn insert(
        &self,
        agreement_id: Uuid,
        payload: &GenerateAgreementPayload,
        storage_path: &str,
    ) -> Result<RentAgreement, AppError> {
        let agreement = sqlx::query_as::<_, RentAgreement>(
            r#"
            INSERT INTO rent_agreements (
                id, property_id, tenant_id, landlord_id, monthly_rent, security_deposit,
                start_date, end_date, terms, storage_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(agreement_id)
        .bind(payload.property_id)
        .bind(payload.tenant_id)
        .bind(payload.landlord_id)
        .bind(payload.monthly_rent)
        .bind(payload.security_deposit)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.terms)
        .bind(storage_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(agreement)
    }

    async fn find_by_id(&self, agreement_id: Uuid) -> Result<Option<RentAgreement>, AppError> {
        let agreement = sqlx::query_as::<_, RentAgreement>("SELECT * FROM rent_agreements WHERE id = $1")
            .bind(agreement_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agreement)
    }

    async fn property_owner(&self, property_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let owner_id = sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner_id)
    }
}
