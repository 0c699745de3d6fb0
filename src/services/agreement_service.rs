// src/services/agreement_service.rs

use chrono::Utc;
use std::{path::PathBuf, sync::Arc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AgreementStore, RoleStore},
    models::{
        agreement::{AgreementDocument, GenerateAgreementPayload, GenerateAgreementResponse, RentAgreement},
        auth::{AppRole, User},
    },
    services::document_service::render_agreement_pdf,
};

#[derive(Clone)]
pub struct AgreementService {
    store: Arc<dyn AgreementStore>,
    roles: Arc<dyn RoleStore>,
    fonts_dir: PathBuf,
    storage_dir: PathBuf,
    app_base_url: String,
}

impl AgreementService {
    pub fn new(
        store: Arc<dyn AgreementStore>,
        roles: Arc<dyn RoleStore>,
        fonts_dir: PathBuf,
        storage_dir: PathBuf,
        app_base_url: String,
    ) -> Self {
        Self { store, roles, fonts_dir, storage_dir, app_base_url }
    }

    pub async fn generate(
        &self,
        caller: &User,
        payload: GenerateAgreementPayload,
    ) -> Result<GenerateAgreementResponse, AppError> {
        let is_party = caller.id == payload.tenant_id || caller.id == payload.landlord_id;
        if !is_party && !self.is_admin(caller.id).await? {
            return Err(AppError::Forbidden("Apenas as partes do contrato podem gerá-lo.".into()));
        }

        let parties = self
            .store
            .load_parties(payload.property_id, payload.landlord_id, payload.tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Imóvel".into()))?;

        if parties.owner_id != payload.landlord_id {
            tracing::warn!(
                "Locador {} não é o dono do imóvel {}",
                payload.landlord_id,
                payload.property_id
            );
            return Err(AppError::Forbidden("O locador deve ser o proprietário do imóvel.".into()));
        }

        tracing::info!("Gerando contrato de aluguel para o imóvel {}", payload.property_id);

        let agreement_id = Uuid::new_v4();
        let document = AgreementDocument {
            agreement_id,
            issued_on: Utc::now().date_naive(),
            landlord_name: parties.landlord_name.unwrap_or_else(|| "Property Owner".into()),
            tenant_name: parties.tenant_name.unwrap_or_else(|| "Tenant".into()),
            address: parties.address,
            city: parties.city,
            property_type: parties.property_type.as_str().to_string(),
            bedrooms: parties.bedrooms,
            bathrooms: parties.bathrooms,
            monthly_rent: payload.monthly_rent,
            security_deposit: payload.security_deposit,
            start_date: payload.start_date,
            end_date: payload.end_date,
            terms: payload.terms.clone(),
            verification_url: format!("{}/agreements/{}", self.app_base_url, agreement_id),
        };

        // genpdf é síncrono
        let fonts_dir = self.fonts_dir.clone();
        let pdf = tokio::task::spawn_blocking(move || render_agreement_pdf(&fonts_dir, &document))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização do PDF: {}", e))??;

        let storage_path = format!(
            "{}/{}-{}.pdf",
            payload.tenant_id,
            payload.property_id,
            Utc::now().timestamp_millis()
        );
        let full_path = self.storage_dir.join(&storage_path);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar diretório do contrato: {}", e))?;
        }
        tokio::fs::write(&full_path, &pdf)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar o PDF: {}", e))?;

        let agreement = self.store.insert(agreement_id, &payload, &storage_path).await?;

        tracing::info!("✅ Contrato gerado: {}", agreement.id);
        Ok(GenerateAgreementResponse {
            success: true,
            agreement_id: agreement.id,
            storage_path,
            url: format!("/api/agreements/{}/document", agreement.id),
        })
    }

    /// Lê o PDF armazenado (inquilino, dono do imóvel ou admin).
    pub async fn load_document(&self, caller: &User, agreement_id: Uuid) -> Result<(RentAgreement, Vec<u8>), AppError> {
        let agreement = self
            .store
            .find_by_id(agreement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contrato".into()))?;

        if !self.can_read(caller.id, &agreement).await? {
            return Err(AppError::Forbidden("Você não tem acesso a este contrato.".into()));
        }

        let bytes = tokio::fs::read(self.storage_dir.join(&agreement.storage_path))
            .await
            .map_err(|e| {
                tracing::error!("🔥 PDF do contrato {} ilegível: {}", agreement.id, e);
                AppError::NotFound("Documento do contrato".into())
            })?;

        Ok((agreement, bytes))
    }

    async fn can_read(&self, caller_id: Uuid, agreement: &RentAgreement) -> Result<bool, AppError> {
        if caller_id == agreement.tenant_id {
            return Ok(true);
        }
        if self.store.property_owner(agreement.property_id).await? == Some(caller_id) {
            return Ok(true);
        }
        self.is_admin(caller_id).await
    }

    async fn is_admin(&self, user_id: Uuid) -> Result<bool, AppError> {
        self.roles.has_role(user_id, AppRole::Admin).await
    }
}
