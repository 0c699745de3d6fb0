// src/handlers/kyc.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{Admin, RequireRole},
    },
    models::kyc::{KycVerification, PendingKyc, RejectKycPayload, SubmitKycPayload},
};

// POST /api/kyc
pub async fn submit_kyc(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SubmitKycPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let verification = app_state.kyc_service.submit(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(verification)))
}

// GET /api/kyc
pub async fn list_my_kyc(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<KycVerification>>, AppError> {
    Ok(Json(app_state.kyc_service.list_mine(user.id).await?))
}

// GET /api/admin/kyc
pub async fn list_pending_kyc(
    State(app_state): State<AppState>,
    _guard: RequireRole<Admin>,
) -> Result<Json<Vec<PendingKyc>>, AppError> {
    Ok(Json(app_state.kyc_service.list_pending().await?))
}

// POST /api/admin/kyc/{id}/approve
pub async fn approve_kyc(
    State(app_state): State<AppState>,
    _guard: RequireRole<Admin>,
    Path(kyc_id): Path<Uuid>,
) -> Result<Json<KycVerification>, AppError> {
    Ok(Json(app_state.kyc_service.approve(kyc_id).await?))
}

// POST /api/admin/kyc/{id}/reject (corpo opcional)
pub async fn reject_kyc(
    State(app_state): State<AppState>,
    _guard: RequireRole<Admin>,
    Path(kyc_id): Path<Uuid>,
    payload: Option<Json<RejectKycPayload>>,
) -> Result<Json<Value>, AppError> {
    let Json(payload) = payload.unwrap_or_default();

    app_state.kyc_service.reject(kyc_id, payload.notes.as_deref()).await?;

    Ok(Json(json!({ "success": true })))
}
