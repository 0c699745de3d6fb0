// src/services/webhook_service.rs

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingStore, NotificationStore, PaymentStore},
    models::{
        booking::BookingStatus,
        notification::{NewNotification, NOTIFY_PAYMENT_SUCCESS},
        payment::{PaymentStatus, SessionTransition},
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

type HmacSha256 = Hmac<Sha256>;

// Janela aceita entre o timestamp assinado e o relógio local
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Confere o header `Stripe-Signature` (`t=<unix>,v1=<hex>`) contra o corpo bruto.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<(), AppError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| AppError::SignatureError("Timestamp ausente.".into()))?;
    if signatures.is_empty() {
        return Err(AppError::SignatureError("Nenhuma assinatura v1.".into()));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::SignatureError("Timestamp fora da tolerância.".into()));
    }

    for signature in signatures {
        let Ok(expected) = hex::decode(signature) else { continue };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Chave HMAC inválida: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // Comparação em tempo constante
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::SignatureError("Assinatura não confere.".into()))
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: Option<SessionMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionMetadata {
    booking_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
}

#[derive(Clone)]
pub struct WebhookService {
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentStore>,
    notifications: Arc<dyn NotificationStore>,
    webhook_secret: Option<String>,
    feed: ChangeFeed,
}

impl WebhookService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentStore>,
        notifications: Arc<dyn NotificationStore>,
        webhook_secret: Option<String>,
        feed: ChangeFeed,
    ) -> Self {
        Self { bookings, payments, notifications, webhook_secret, feed }
    }

    /// Verifica a assinatura sobre o corpo bruto e só então decodifica e aplica o evento.
    pub async fn handle(&self, payload: &[u8], signature: Option<&str>) -> Result<(), AppError> {
        let (Some(signature), Some(secret)) = (signature, self.webhook_secret.as_deref()) else {
            tracing::error!("🔥 Webhook sem assinatura ou sem STRIPE_WEBHOOK_SECRET");
            return Err(AppError::SignatureError("Assinatura ausente.".into()));
        };

        if let Err(e) = verify_signature(payload, signature, secret, Utc::now().timestamp()) {
            tracing::error!("🔥 Assinatura de webhook rejeitada: {}", e);
            return Err(e);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::SignatureError(format!("Evento ilegível: {}", e)))?;

        tracing::info!("Evento Stripe recebido: {}", event.event_type);

        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = serde_json::from_value(event.data.object)
                    .map_err(|e| AppError::SignatureError(format!("Sessão ilegível: {}", e)))?;
                self.on_checkout_completed(session).await
            }
            "payment_intent.succeeded" => {
                let intent = Self::intent(event.data.object)?;
                self.on_intent(&intent.id, PaymentStatus::Succeeded).await
            }
            "payment_intent.payment_failed" => {
                let intent = Self::intent(event.data.object)?;
                self.on_intent(&intent.id, PaymentStatus::Failed).await
            }
            other => {
                tracing::info!("Evento não tratado: {}", other);
                Ok(())
            }
        }
    }

    fn intent(object: Value) -> Result<PaymentIntentObject, AppError> {
        serde_json::from_value(object).map_err(|e| AppError::SignatureError(format!("PaymentIntent ilegível: {}", e)))
    }

    async fn on_checkout_completed(&self, session: CheckoutSessionObject) -> Result<(), AppError> {
        tracing::info!("Checkout concluído: {}", session.id);

        let transition = self
            .payments
            .complete_session(&session.id, session.payment_intent.as_deref())
            .await?;

        if transition == SessionTransition::NoMatch {
            tracing::warn!("Nenhum pagamento para a sessão {}", session.id);
        }

        let metadata = session.metadata.unwrap_or_default();
        let Some(booking_id) = metadata.booking_id.as_deref().and_then(|id| Uuid::parse_str(id).ok()) else {
            return Ok(());
        };

        // "Seta para confirmed": reaplicar é inofensivo
        match self.bookings.set_status(booking_id, BookingStatus::Confirmed).await? {
            Some(booking) => self.feed.publish(ChangeEvent::new(
                "bookings",
                ChangeKind::Update,
                Some(booking.user_id),
                &booking,
            )),
            None => tracing::warn!("Reserva {} não encontrada para confirmação", booking_id),
        }

        // Reentregas não geram uma segunda notificação
        if transition == SessionTransition::AlreadySucceeded {
            return Ok(());
        }

        if let Some(user_id) = metadata.user_id.as_deref().and_then(|id| Uuid::parse_str(id).ok()) {
            let notification = NewNotification::new(user_id, NOTIFY_PAYMENT_SUCCESS, "Payment Successful")
                .with_body("Your booking payment has been confirmed.")
                .with_link("/payments");

            match self.notifications.insert_notification(notification).await {
                Ok(row) => self
                    .feed
                    .publish(ChangeEvent::new("notifications", ChangeKind::Insert, Some(user_id), &row)),
                Err(e) => tracing::warn!("Falha ao notificar pagamento para {}: {}", user_id, e),
            }
        }

        Ok(())
    }

    // Última escrita vence: um evento atrasado pode sobrescrever um status mais novo
    async fn on_intent(&self, payment_intent: &str, status: PaymentStatus) -> Result<(), AppError> {
        let updated = self.payments.set_status_by_intent(payment_intent, status).await?;
        tracing::info!("PaymentIntent {} -> {:?} ({} linha(s))", payment_intent, status, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sign_payload, MemoryStore};
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    fn service(store: &Arc<MemoryStore>) -> WebhookService {
        WebhookService::new(store.clone(), store.clone(), store.clone(), Some(SECRET.into()), ChangeFeed::new())
    }

    fn completed_event(session_id: &str, booking_id: Uuid, user_id: Uuid) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": session_id,
                "payment_intent": "pi_123",
                "metadata": { "booking_id": booking_id.to_string(), "user_id": user_id.to_string() }
            }}
        }))
        .unwrap()
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"type":"x"}"#;
        let now = 1_700_000_000;
        let header = sign_payload(body, SECRET, now);

        assert!(verify_signature(body, &header, SECRET, now).is_ok());
    }

    #[test]
    fn tampered_body_or_stale_timestamp_is_rejected() {
        let now = 1_700_000_000;
        let header = sign_payload(b"original", SECRET, now);

        assert!(verify_signature(b"forged", &header, SECRET, now).is_err());
        assert!(verify_signature(b"original", &header, SECRET, now + SIGNATURE_TOLERANCE_SECS + 1).is_err());
        assert!(verify_signature(b"original", "v1=abc", SECRET, now).is_err());
    }

    #[tokio::test]
    async fn replayed_completion_confirms_once_and_notifies_once() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let booking_id = store.seed_booking(user_id, "Sunny 2BHK", BookingStatus::Pending);
        store.seed_payment(booking_id, user_id, "cs_test_1");
        let webhook = service(&store);

        let body = completed_event("cs_test_1", booking_id, user_id);
        let header = sign_payload(&body, SECRET, Utc::now().timestamp());

        webhook.handle(&body, Some(&header)).await.unwrap();
        webhook.handle(&body, Some(&header)).await.unwrap();

        let payment = &store.payments()[0];
        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.stripe_payment_intent.as_deref(), Some("pi_123"));
        assert_eq!(store.booking(booking_id).unwrap().status, BookingStatus::Confirmed);

        let notifications = store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NOTIFY_PAYMENT_SUCCESS);
        assert_eq!(notifications[0].user_id, user_id);
    }

    #[tokio::test]
    async fn completion_without_payment_row_still_confirms_and_notifies() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let booking_id = store.seed_booking(user_id, "Studio Baner", BookingStatus::Pending);
        let webhook = service(&store);

        let body = completed_event("cs_sem_pagamento", booking_id, user_id);
        let header = sign_payload(&body, SECRET, Utc::now().timestamp());

        webhook.handle(&body, Some(&header)).await.unwrap();

        assert!(store.payments().is_empty());
        assert_eq!(store.booking(booking_id).unwrap().status, BookingStatus::Confirmed);

        let notifications = store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NOTIFY_PAYMENT_SUCCESS);
        assert_eq!(notifications[0].user_id, user_id);
    }

    #[tokio::test]
    async fn invalid_signature_mutates_nothing() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let booking_id = store.seed_booking(user_id, "Casa", BookingStatus::Pending);
        store.seed_payment(booking_id, user_id, "cs_test_2");
        let webhook = service(&store);

        let body = completed_event("cs_test_2", booking_id, user_id);
        let forged = sign_payload(&body, "whsec_wrong", Utc::now().timestamp());

        let err = webhook.handle(&body, Some(&forged)).await.unwrap_err();
        assert!(matches!(err, AppError::SignatureError(_)));

        let err = webhook.handle(&body, None).await.unwrap_err();
        assert!(matches!(err, AppError::SignatureError(_)));

        assert_eq!(store.payments()[0].status, PaymentStatus::Pending);
        assert_eq!(store.booking(booking_id).unwrap().status, BookingStatus::Pending);
        assert!(store.notifications().is_empty());
    }

    #[tokio::test]
    async fn intent_failure_marks_payment_failed() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        let booking_id = store.seed_booking(user_id, "Casa", BookingStatus::Pending);
        store.seed_payment(booking_id, user_id, "cs_test_3");
        let webhook = service(&store);

        let completed = completed_event("cs_test_3", booking_id, user_id);
        webhook
            .handle(&completed, Some(&sign_payload(&completed, SECRET, Utc::now().timestamp())))
            .await
            .unwrap();

        let failed = serde_json::to_vec(&json!({
            "type": "payment_intent.payment_failed",
            "data": { "object": { "id": "pi_123" } }
        }))
        .unwrap();
        webhook
            .handle(&failed, Some(&sign_payload(&failed, SECRET, Utc::now().timestamp())))
            .await
            .unwrap();

        assert_eq!(store.payments()[0].status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn unknown_event_is_acknowledged_without_changes() {
        let store = Arc::new(MemoryStore::default());
        let body = serde_json::to_vec(&json!({
            "type": "customer.created",
            "data": { "object": { "id": "cus_1" } }
        }))
        .unwrap();

        service(&store)
            .handle(&body, Some(&sign_payload(&body, SECRET, Utc::now().timestamp())))
            .await
            .unwrap();

        assert!(store.payments().is_empty());
        assert!(store.notifications().is_empty());
    }
}
