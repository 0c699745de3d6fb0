// src/db/favorite_repo.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::favorite::{FavoriteWithProperty, SavedSearch},
};

/// Favoritos e buscas salvas: listas pessoais do inquilino.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<FavoriteWithProperty>, AppError>;

    async fn add_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<Uuid, AppError>;

    // `false` quando não havia favorito
    async fn remove_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, AppError>;

    async fn list_saved_searches(&self, user_id: Uuid) -> Result<Vec<SavedSearch>, AppError>;

    async fn create_saved_search(
        &self,
        user_id: Uuid,
        name: &str,
        filters: &Value,
        bounds: Option<&Value>,
    ) -> Result<SavedSearch, AppError>;

    async fn delete_saved_search(&self, search_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<FavoriteWithProperty>, AppError> {
        let favorites = sqlx::query_as::<_, FavoriteWithProperty>(
            r#"
            SELECT f.id, f.property_id, f.created_at,
                   p.title, p.city, p.price, p.bedrooms, p.bathrooms, p.area, p.images, p.property_type
            FROM favorites f
            JOIN properties p ON p.id = f.property_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }

    async fn add_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO favorites (user_id, property_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation("Imóvel já está nos favoritos.".into());
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Imóvel".into());
                }
            }
            e.into()
        })?;

        Ok(id)
    }

    async fn remove_favorite(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // --- Buscas salvas ---

    async fn list_saved_searches(&self, user_id: Uuid) -> Result<Vec<SavedSearch>, AppError> {
        let searches = sqlx::query_as::<_, SavedSearch>(
            "SELECT * FROM saved_searches WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(searches)
    }

    async fn create_saved_search(
        &self,
        user_id: Uuid,
        name: &str,
        filters: &Value,
        bounds: Option<&Value>,
    ) -> Result<SavedSearch, AppError> {
        let search = sqlx::query_as::<_, SavedSearch>(
            r#"
            INSERT INTO saved_searches (user_id, name, filters, bounds)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(Json(filters))
        .bind(bounds.map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(search)
    }

    async fn delete_saved_search(&self, search_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND user_id = $2")
            .bind(search_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
