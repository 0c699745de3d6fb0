// src/handlers/bookings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::booking::{BookVisitPayload, BookingWithProperty},
};

// POST /api/bookings/visit
pub async fn book_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<BookVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.booking_service.book_visit(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/bookings
pub async fn list_my_bookings(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<BookingWithProperty>>, AppError> {
    Ok(Json(app_state.booking_service.list_mine(user.id).await?))
}

// DELETE /api/bookings/{id}
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.booking_service.cancel(user.id, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/owner/bookings
pub async fn list_owner_bookings(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<BookingWithProperty>>, AppError> {
    Ok(Json(app_state.booking_service.list_for_owner(user.id).await?))
}
