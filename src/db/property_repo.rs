// src/db/property_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::property::{
        CreatePropertyPayload, Property, PropertyImage, PropertySearchQuery, PropertyStatus,
        UpdatePropertyPayload,
    },
};

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn search(&self, query: &PropertySearchQuery) -> Result<Vec<Property>, AppError>;

    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<Property>, AppError>;

    async fn list_images(&self, property_id: Uuid) -> Result<Vec<PropertyImage>, AppError>;

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, AppError>;

    async fn create(&self, owner_id: Uuid, payload: &CreatePropertyPayload) -> Result<Property, AppError>;

    async fn update(&self, property_id: Uuid, payload: &UpdatePropertyPayload) -> Result<Option<Property>, AppError>;

    async fn set_status(&self, property_id: Uuid, status: PropertyStatus) -> Result<Option<Property>, AppError>;
}

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PropertyRepository {
    // =========================================================================
    //  BUSCA PÚBLICA
    // =========================================================================

    /// Busca de anúncios disponíveis. Destaques primeiro, depois os mais novos.
    async fn search(&self, query: &PropertySearchQuery) -> Result<Vec<Property>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM properties WHERE status = 'available'");

        if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            builder.push(" AND city ILIKE ").push_bind(format!("%{}%", city));
        }
        if let Some(property_type) = query.property_type {
            builder.push(" AND property_type = ").push_bind(property_type);
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(min_bedrooms) = query.min_bedrooms {
            builder.push(" AND bedrooms >= ").push_bind(min_bedrooms);
        }

        builder
            .push(" ORDER BY is_promoted DESC, created_at DESC LIMIT ")
            .push_bind(query.effective_limit())
            .push(" OFFSET ")
            .push_bind(query.effective_offset());

        let properties = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    async fn list_images(&self, property_id: Uuid) -> Result<Vec<PropertyImage>, AppError> {
        let images = sqlx::query_as::<_, PropertyImage>(
            "SELECT * FROM property_images WHERE property_id = $1 ORDER BY is_primary DESC, created_at ASC",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    // =========================================================================
    //  ESCRITA (dono do anúncio)
    // =========================================================================

    async fn create(&self, owner_id: Uuid, payload: &CreatePropertyPayload) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                owner_id, title, description, property_type, price, city, address,
                bedrooms, bathrooms, area, amenities, images, is_promoted, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.property_type)
        .bind(payload.price)
        .bind(&payload.city)
        .bind(&payload.address)
        .bind(payload.bedrooms)
        .bind(payload.bathrooms)
        .bind(payload.area)
        .bind(&payload.amenities)
        .bind(&payload.images)
        .bind(payload.is_promoted)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .fetch_one(&self.pool)
        .await?;

        Ok(property)
    }

    /// Atualização parcial: `NULL` em um parâmetro mantém o valor atual.
    async fn update(
        &self,
        property_id: Uuid,
        payload: &UpdatePropertyPayload,
    ) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                bedrooms = COALESCE($5, bedrooms),
                bathrooms = COALESCE($6, bathrooms),
                area = COALESCE($7, area),
                amenities = COALESCE($8, amenities),
                images = COALESCE($9, images),
                is_promoted = COALESCE($10, is_promoted),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.bedrooms)
        .bind(payload.bathrooms)
        .bind(payload.area)
        .bind(&payload.amenities)
        .bind(&payload.images)
        .bind(payload.is_promoted)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn set_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            "UPDATE properties SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(property_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }
}
