// src/models/favorite.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::property::PropertyType;

// Favorito + resumo do imóvel para o card
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteWithProperty {
    pub id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub city: String,
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: Option<Decimal>,
    pub images: Vec<String>,
    pub property_type: PropertyType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoritePayload {
    pub property_id: Uuid,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filters: sqlx::types::Json<Value>,
    pub bounds: Option<sqlx::types::Json<Value>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedSearchPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: String,
    #[serde(default = "empty_object")]
    pub filters: Value,
    pub bounds: Option<Value>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
