// src/handlers/properties.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{Host, RequireRole},
    },
    models::property::{
        CreatePropertyPayload, Property, PropertyDetail, PropertySearchQuery, UpdatePropertyPayload,
        UpdatePropertyStatusPayload,
    },
};

// GET /api/properties (público)
pub async fn search_properties(
    State(app_state): State<AppState>,
    Query(query): Query<PropertySearchQuery>,
) -> Result<Json<Vec<Property>>, AppError> {
    Ok(Json(app_state.property_service.search(&query).await?))
}

// GET /api/properties/{id} (público)
pub async fn get_property(
    State(app_state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyDetail>, AppError> {
    Ok(Json(app_state.property_service.detail(property_id).await?))
}

// POST /api/properties
pub async fn create_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<Host>,
    Json(payload): Json<CreatePropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let property = app_state.property_service.create(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(property)))
}

// PUT /api/properties/{id}
pub async fn update_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<Json<Property>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.property_service.update(user.id, property_id, payload).await?))
}

// PATCH /api/properties/{id}/status
pub async fn update_property_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyStatusPayload>,
) -> Result<Json<Property>, AppError> {
    Ok(Json(
        app_state
            .property_service
            .set_status(user.id, property_id, payload.status)
            .await?,
    ))
}

// GET /api/owner/properties
pub async fn list_owner_properties(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Property>>, AppError> {
    Ok(Json(app_state.property_service.list_for_owner(user.id).await?))
}
