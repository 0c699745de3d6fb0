// src/models/agreement.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RentAgreement {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub monthly_rent: Decimal,
    pub security_deposit: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub terms: Option<String>,
    pub storage_path: String,
    pub signed: bool,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_lease_period"))]
pub struct GenerateAgreementPayload {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub monthly_rent: Decimal,
    pub security_deposit: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 10000, message = "Os termos devem ter no máximo 10000 caracteres."))]
    pub terms: Option<String>,
}

fn validate_lease_period(payload: &GenerateAgreementPayload) -> Result<(), ValidationError> {
    if payload.start_date > payload.end_date {
        return Err(ValidationError::new("lease_period")
            .with_message("A data de início deve ser anterior à data de término.".into()));
    }
    if payload.monthly_rent <= Decimal::ZERO || payload.security_deposit < Decimal::ZERO {
        return Err(ValidationError::new("amounts")
            .with_message("Aluguel deve ser positivo e caução não pode ser negativa.".into()));
    }
    Ok(())
}

// Dados necessários para desenhar o PDF
#[derive(Debug, Clone)]
pub struct AgreementDocument {
    pub agreement_id: Uuid,
    pub issued_on: NaiveDate,
    pub landlord_name: String,
    pub tenant_name: String,
    pub address: String,
    pub city: String,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub monthly_rent: Decimal,
    pub security_deposit: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub terms: Option<String>,
    pub verification_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAgreementResponse {
    pub success: bool,
    pub agreement_id: Uuid,
    pub storage_path: String,
    pub url: String,
}
