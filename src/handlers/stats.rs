// src/handlers/stats.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        rbac::{Admin, RequireRole},
    },
    models::stats::{AggregationReport, OwnerStatsQuery, OwnerStatsResponse, TrackEventPayload},
};

// POST /api/events (público; anexa o usuário quando houver token)
pub async fn track_event(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<TrackEventPayload>,
) -> Result<StatusCode, AppError> {
    app_state
        .stats_service
        .track_event(user.map(|u| u.id), payload)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

// GET /api/owner/stats?days=N
pub async fn owner_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<OwnerStatsQuery>,
) -> Result<Json<OwnerStatsResponse>, AppError> {
    Ok(Json(app_state.stats_service.owner_stats(user.id, query.days).await?))
}

// POST /api/admin/stats/aggregate
pub async fn run_aggregation(
    State(app_state): State<AppState>,
    _guard: RequireRole<Admin>,
) -> Result<Json<AggregationReport>, AppError> {
    Ok(Json(app_state.stats_service.aggregate_yesterday().await?))
}
