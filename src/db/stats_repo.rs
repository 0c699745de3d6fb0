// src/db/stats_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::stats::{DayWindow, OwnerStat, PropertyOwner, TrackedEvent},
};

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn list_property_owners(&self) -> Result<Vec<PropertyOwner>, AppError>;

    async fn count_events(
        &self,
        property_id: Uuid,
        event: TrackedEvent,
        window: &DayWindow,
    ) -> Result<i64, AppError>;

    async fn count_bookings(&self, property_id: Uuid, window: &DayWindow) -> Result<i64, AppError>;

    /// Chave composta (owner, property, date): reexecutar sobrescreve, não duplica.
    async fn upsert_owner_stat(&self, stat: &OwnerStat) -> Result<(), AppError>;

    async fn record_event(
        &self,
        event: TrackedEvent,
        property_id: Option<Uuid>,
        user_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), AppError>;

    async fn list_for_owner(&self, owner_id: Uuid, since: NaiveDate) -> Result<Vec<OwnerStat>, AppError>;
}

#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for StatsRepository {
    async fn list_property_owners(&self) -> Result<Vec<PropertyOwner>, AppError> {
        let rows = sqlx::query_as::<_, PropertyOwner>("SELECT id, owner_id FROM properties ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_events(
        &self,
        property_id: Uuid,
        event: TrackedEvent,
        window: &DayWindow,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM events
            WHERE property_id = $1 AND event_type = $2
              AND created_at >= $3 AND created_at < $4
            "#,
        )
        .bind(property_id)
        .bind(event.as_str())
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_bookings(&self, property_id: Uuid, window: &DayWindow) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE property_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(property_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn upsert_owner_stat(&self, stat: &OwnerStat) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO owner_stats (owner_id, property_id, date, views, inquiries, bookings)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (owner_id, property_id, date) DO UPDATE
            SET views = EXCLUDED.views,
                inquiries = EXCLUDED.inquiries,
                bookings = EXCLUDED.bookings
            "#,
        )
        .bind(stat.owner_id)
        .bind(stat.property_id)
        .bind(stat.date)
        .bind(stat.views)
        .bind(stat.inquiries)
        .bind(stat.bookings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_event(
        &self,
        event: TrackedEvent,
        property_id: Option<Uuid>,
        user_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO events (event_type, property_id, user_id, metadata) VALUES ($1, $2, $3, $4)",
        )
        .bind(event.as_str())
        .bind(property_id)
        .bind(user_id)
        .bind(metadata.map(sqlx::types::Json))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Imóvel".into());
                }
            }
            AppError::DatabaseError(e)
        })?;
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid, since: NaiveDate) -> Result<Vec<OwnerStat>, AppError> {
        let rows = sqlx::query_as::<_, OwnerStat>(
            r#"
            SELECT owner_id, property_id, date, views, inquiries, bookings
            FROM owner_stats
            WHERE owner_id = $1 AND date >= $2
            ORDER BY date DESC, property_id
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
