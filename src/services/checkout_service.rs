// src/services/checkout_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    clients::{CheckoutSessionRequest, PaymentGateway},
    common::error::AppError,
    db::{BookingStore, PaymentStore},
    models::{
        auth::User,
        payment::{CheckoutPayload, CheckoutResponse, NewPendingPayment, Payment},
    },
    services::realtime::{ChangeEvent, ChangeFeed, ChangeKind},
};

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Clone)]
pub struct CheckoutService {
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    app_base_url: String,
    feed: ChangeFeed,
}

impl CheckoutService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        app_base_url: String,
        feed: ChangeFeed,
    ) -> Self {
        Self { bookings, payments, gateway, app_base_url, feed }
    }

    /// Abre uma sessão de checkout para a reserva e grava o pagamento `pending`.
    pub async fn create_checkout_session(
        &self,
        user: &User,
        payload: CheckoutPayload,
    ) -> Result<CheckoutResponse, AppError> {
        let booking_id = Uuid::parse_str(payload.booking_id.trim())
            .map_err(|_| AppError::InvalidInput("bookingId inválido.".into()))?;

        tracing::info!("Criando sessão de checkout para a reserva {}", booking_id);

        let booking = self
            .bookings
            .find_for_checkout(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva".into()))?;

        if booking.user_id != user.id {
            return Err(AppError::Forbidden("A reserva pertence a outro usuário.".into()));
        }

        let gateway = self.gateway.as_ref().ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("STRIPE_SECRET_KEY não configurada"))
        })?;

        // 1. Cliente do provedor (um por e-mail)
        let customer_id = gateway.find_or_create_customer(&user.email, user.id).await?;

        // 2. Sessão hospedada
        let currency = payload
            .currency
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let session = gateway
            .create_checkout_session(CheckoutSessionRequest {
                customer_id,
                booking_id,
                user_id: user.id,
                product_name: booking.property_title.clone(),
                amount: payload.amount,
                currency: currency.clone(),
                success_url: payload.success_url.unwrap_or_else(|| {
                    format!("{}/payments?success=true&session_id={{CHECKOUT_SESSION_ID}}", self.app_base_url)
                }),
                cancel_url: payload
                    .cancel_url
                    .unwrap_or_else(|| format!("{}/payments?canceled=true", self.app_base_url)),
            })
            .await?;

        let url = session
            .url
            .clone()
            .ok_or_else(|| AppError::UpstreamError("Sessão de checkout sem URL.".into()))?;

        // 3. Só grava depois que o provedor confirmou a sessão
        let payment = self
            .payments
            .insert_pending(NewPendingPayment {
                booking_id,
                user_id: user.id,
                amount: payload.amount,
                currency,
                stripe_session_id: session.id.clone(),
            })
            .await?;

        self.feed
            .publish(ChangeEvent::new("payments", ChangeKind::Insert, Some(user.id), &payment));

        tracing::info!("✅ Sessão de checkout criada: {}", session.id);

        Ok(CheckoutResponse { url, session_id: session.id })
    }

    pub async fn list_payments(&self, user_id: Uuid) -> Result<Vec<Payment>, AppError> {
        self.payments.list_for_user(user_id).await
    }
}
