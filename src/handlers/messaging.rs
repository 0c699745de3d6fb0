// src/handlers/messaging.rs

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
    models::messaging::{
        Conversation, CreateConversationPayload, MarkReadResponse, Message, PostMessagePayload,
        SendMessagePayload,
    },
};

// POST /api/conversations
pub async fn create_conversation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateConversationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let conversation = app_state.message_service.create_conversation(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

// GET /api/conversations
pub async fn list_conversations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Conversation>>, AppError> {
    Ok(Json(app_state.message_service.list_conversations(user.id).await?))
}

// GET /api/conversations/{id}/messages
pub async fn list_messages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(
        app_state.message_service.list_messages(user.id, conversation_id).await?,
    ))
}

// POST /api/conversations/{id}/messages
pub async fn post_message(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
    Json(payload): Json<PostMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state
        .message_service
        .send_message(&user, conversation_id, &payload.body, payload.attachments)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/messages (conversationId no corpo)
pub async fn send_message(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state
        .message_service
        .send_message(&user, payload.conversation_id, &payload.body, payload.attachments)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/conversations/{id}/read
pub async fn mark_conversation_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, AppError> {
    Ok(Json(app_state.message_service.mark_read(user.id, conversation_id).await?))
}
