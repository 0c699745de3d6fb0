// src/services/notification_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationStore,
    models::notification::Notification,
};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.store.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification, AppError> {
        self.store
            .mark_read(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notificação".into()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.store.mark_all_read(user_id).await
    }
}
