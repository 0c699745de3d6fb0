// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::notification::Notification,
};

// GET /api/notifications
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(app_state.notification_service.list(user.id).await?))
}

// PATCH /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    Ok(Json(
        app_state.notification_service.mark_read(user.id, notification_id).await?,
    ))
}

// POST /api/notifications/read-all
pub async fn mark_all_notifications_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let updated = app_state.notification_service.mark_all_read(user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}
