// src/handlers/payments.rs

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::payment::{CheckoutPayload, CheckoutResponse, Payment},
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// POST /api/payments/checkout
pub async fn create_checkout(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CheckoutPayload>,
) -> Result<Json<CheckoutResponse>, AppError> {
    payload.validate()?;

    Ok(Json(
        app_state.checkout_service.create_checkout_session(&user, payload).await?,
    ))
}

// GET /api/payments
pub async fn list_payments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(app_state.checkout_service.list_payments(user.id).await?))
}

// POST /api/webhooks/stripe
// Corpo bruto: a assinatura é calculada sobre os bytes exatos recebidos.
pub async fn stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    app_state.webhook_service.handle(&body, signature).await?;

    Ok(Json(json!({ "received": true })))
}
