// src/handlers/agreements.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::agreement::GenerateAgreementPayload,
};

// POST /api/agreements
pub async fn generate_agreement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<GenerateAgreementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.agreement_service.generate(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/agreements/{id}/document
pub async fn download_agreement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(agreement_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (agreement, bytes) = app_state.agreement_service.load_document(&user, agreement_id).await?;

    let disposition = format!("inline; filename=\"rent-agreement-{}.pdf\"", agreement.id);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
