// src/handlers/favorites.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::favorite::{AddFavoritePayload, CreateSavedSearchPayload, FavoriteWithProperty, SavedSearch},
};

// GET /api/favorites
pub async fn list_favorites(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<FavoriteWithProperty>>, AppError> {
    Ok(Json(app_state.favorite_service.list(user.id).await?))
}

// POST /api/favorites
pub async fn add_favorite(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AddFavoritePayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.favorite_service.add(user.id, payload.property_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// DELETE /api/favorites/{propertyId}
pub async fn remove_favorite(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.favorite_service.remove(user.id, property_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/saved-searches
pub async fn list_saved_searches(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<SavedSearch>>, AppError> {
    Ok(Json(app_state.favorite_service.list_saved_searches(user.id).await?))
}

// POST /api/saved-searches
pub async fn create_saved_search(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSavedSearchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let search = app_state.favorite_service.save_search(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(search)))
}

// DELETE /api/saved-searches/{id}
pub async fn delete_saved_search(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(search_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.favorite_service.delete_saved_search(user.id, search_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
