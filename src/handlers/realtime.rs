// src/handlers/realtime.rs

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, services::realtime::ChangeEvent};

// Navegadores não enviam Authorization no handshake do WebSocket: o token vem na query
#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    pub token: String,
    pub table: String,
}

// GET /api/realtime?token=<jwt>&table=<nome>
pub async fn realtime_socket(
    State(app_state): State<AppState>,
    Query(query): Query<RealtimeQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let user = app_state.auth_service.validate_token(&query.token).await?;

    // Assina antes do upgrade para não perder eventos do intervalo
    let changes = app_state.feed.subscribe();

    Ok(ws.on_upgrade(move |socket| stream_changes(socket, changes, query.table, user.id)))
}

async fn stream_changes(socket: WebSocket, mut changes: Receiver<ChangeEvent>, table: String, user_id: Uuid) {
    tracing::info!("Realtime conectado: usuário {} na tabela {}", user_id, table);

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match changes.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Assinante realtime atrasado, {} eventos descartados", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if !event.visible_to(&table, user_id) {
                continue;
            }

            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Evento realtime não serializável: {}", e);
                    continue;
                }
            };

            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // O cliente só envia ping/close
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Erro no WebSocket realtime: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    tracing::info!("Realtime desconectado: usuário {}", user_id);
}
