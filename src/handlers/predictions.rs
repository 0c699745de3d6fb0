// src/handlers/predictions.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::prediction::{RentPrediction, RentPredictionPayload},
};

// POST /api/predictions/rent
pub async fn predict_rent(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<RentPredictionPayload>,
) -> Result<Json<RentPrediction>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.prediction_service.predict(&payload).await?))
}
