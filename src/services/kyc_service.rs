// src/services/kyc_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{KycRepository, NotificationStore},
    models::{
        kyc::{KycVerification, PendingKyc, SubmitKycPayload},
        notification::{NewNotification, NOTIFY_KYC_APPROVED, NOTIFY_KYC_REJECTED},
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

const DEFAULT_REJECTION_REASON: &str = "Document rejected by admin";

pub(crate) fn approval_notice(user_id: Uuid) -> NewNotification {
    NewNotification::new(user_id, NOTIFY_KYC_APPROVED, "KYC Approved")
        .with_body("Your identity verification has been approved. You are now verified!")
        .with_link("/profile")
}

pub(crate) fn rejection_notice(user_id: Uuid, notes: Option<&str>) -> NewNotification {
    let reason = notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_REJECTION_REASON);

    NewNotification::new(user_id, NOTIFY_KYC_REJECTED, "KYC Rejected")
        .with_body(format!("Your identity verification was rejected. Reason: {}", reason))
        .with_link("/kyc")
}

#[derive(Clone)]
pub struct KycService {
    repo: KycRepository,
    notifications: Arc<dyn NotificationStore>,
    feed: ChangeFeed,
}

impl KycService {
    pub fn new(repo: KycRepository, notifications: Arc<dyn NotificationStore>, feed: ChangeFeed) -> Self {
        Self { repo, notifications, feed }
    }

    pub async fn submit(&self, user_id: Uuid, payload: SubmitKycPayload) -> Result<KycVerification, AppError> {
        let verification = self
            .repo
            .submit(
                user_id,
                payload.document_type.trim(),
                payload.document_number.trim(),
                payload.document_url.as_deref(),
            )
            .await?;

        tracing::info!("KYC enviado: {}", verification.id);
        Ok(verification)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<KycVerification>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingKyc>, AppError> {
        self.repo.list_pending().await
    }

    pub async fn approve(&self, kyc_id: Uuid) -> Result<KycVerification, AppError> {
        let verification = self
            .repo
            .approve(kyc_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Verificação KYC".into()))?;

        self.notify(approval_notice(verification.user_id)).await;
        tracing::info!("✅ KYC aprovado: {}", kyc_id);
        Ok(verification)
    }

    /// Rejeição remove o registro e avisa o usuário com o motivo.
    pub async fn reject(&self, kyc_id: Uuid, notes: Option<&str>) -> Result<(), AppError> {
        let removed = self
            .repo
            .delete(kyc_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Verificação KYC".into()))?;

        self.notify(rejection_notice(removed.user_id, notes)).await;
        tracing::info!("KYC rejeitado: {}", kyc_id);
        Ok(())
    }

    async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        match self.notifications.insert_notification(notification).await {
            Ok(row) => self
                .feed
                .publish(ChangeEvent::new("notifications", ChangeKind::Insert, Some(user_id), &row)),
            Err(e) => tracing::warn!("Falha ao notificar revisão de KYC para {}: {}", user_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_uses_default_reason_when_notes_are_blank() {
        let user = Uuid::new_v4();

        let notice = rejection_notice(user, Some("  "));
        assert_eq!(
            notice.body.as_deref(),
            Some("Your identity verification was rejected. Reason: Document rejected by admin")
        );

        let notice = rejection_notice(user, Some("Foto ilegível"));
        assert_eq!(
            notice.body.as_deref(),
            Some("Your identity verification was rejected. Reason: Foto ilegível")
        );
        assert_eq!(notice.kind, NOTIFY_KYC_REJECTED);
        assert_eq!(notice.link.as_deref(), Some("/kyc"));
    }

    #[test]
    fn approval_links_to_profile() {
        let notice = approval_notice(Uuid::new_v4());
        assert_eq!(notice.title, "KYC Approved");
        assert_eq!(notice.link.as_deref(), Some("/profile"));
    }
}
