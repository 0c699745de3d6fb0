// src/services/favorite_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FavoriteStore,
    models::favorite::{CreateSavedSearchPayload, FavoriteWithProperty, SavedSearch},
};

#[derive(Clone)]
pub struct FavoriteService {
    repo: Arc<dyn FavoriteStore>,
}

impl FavoriteService {
    pub fn new(repo: Arc<dyn FavoriteStore>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteWithProperty>, AppError> {
        self.repo.list_favorites(user_id).await
    }

    pub async fn add(&self, user_id: Uuid, property_id: Uuid) -> Result<Uuid, AppError> {
        self.repo.add_favorite(user_id, property_id).await
    }

    pub async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<(), AppError> {
        if !self.repo.remove_favorite(user_id, property_id).await? {
            return Err(AppError::NotFound("Favorito".into()));
        }
        Ok(())
    }

    pub async fn list_saved_searches(&self, user_id: Uuid) -> Result<Vec<SavedSearch>, AppError> {
        self.repo.list_saved_searches(user_id).await
    }

    pub async fn save_search(&self, user_id: Uuid, payload: CreateSavedSearchPayload) -> Result<SavedSearch, AppError> {
        if !payload.filters.is_object() {
            return Err(AppError::InvalidInput("Os filtros devem ser um objeto JSON.".into()));
        }
        self.repo
            .create_saved_search(user_id, payload.name.trim(), &payload.filters, payload.bounds.as_ref())
            .await
    }

    pub async fn delete_saved_search(&self, user_id: Uuid, search_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_saved_search(search_id, user_id).await? {
            return Err(AppError::NotFound("Busca salva".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use serde_json::json;

    fn saved_search(filters: serde_json::Value) -> CreateSavedSearchPayload {
        CreateSavedSearchPayload { name: "  Pune até 30k  ".into(), filters, bounds: None }
    }

    #[tokio::test]
    async fn removing_a_missing_favorite_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let favorites = FavoriteService::new(store.clone());
        let user_id = Uuid::new_v4();
        let property_id = store.seed_listing(Uuid::new_v4());

        favorites.add(user_id, property_id).await.unwrap();
        assert_eq!(favorites.list(user_id).await.unwrap().len(), 1);

        favorites.remove(user_id, property_id).await.unwrap();
        let err = favorites.remove(user_id, property_id).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(favorites.list(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_favorite_conflicts() {
        let store = Arc::new(MemoryStore::default());
        let favorites = FavoriteService::new(store.clone());
        let user_id = Uuid::new_v4();
        let property_id = store.seed_listing(Uuid::new_v4());

        favorites.add(user_id, property_id).await.unwrap();
        let err = favorites.add(user_id, property_id).await.unwrap_err();

        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));
    }

    #[tokio::test]
    async fn saved_search_filters_must_be_an_object() {
        let store = Arc::new(MemoryStore::default());
        let favorites = FavoriteService::new(store.clone());
        let user_id = Uuid::new_v4();

        let err = favorites
            .save_search(user_id, saved_search(json!(["city", "Pune"])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(store.saved_searches().is_empty());

        let saved = favorites
            .save_search(user_id, saved_search(json!({ "city": "Pune", "maxPrice": 30000 })))
            .await
            .unwrap();
        assert_eq!(saved.name, "Pune até 30k");
        assert_eq!(saved.filters.0["city"], "Pune");
    }

    #[tokio::test]
    async fn saved_search_is_deleted_only_by_its_owner() {
        let store = Arc::new(MemoryStore::default());
        let favorites = FavoriteService::new(store.clone());
        let user_id = Uuid::new_v4();
        let saved = favorites.save_search(user_id, saved_search(json!({}))).await.unwrap();

        let err = favorites.delete_saved_search(Uuid::new_v4(), saved.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        favorites.delete_saved_search(user_id, saved.id).await.unwrap();
        assert!(store.saved_searches().is_empty());
    }
}
