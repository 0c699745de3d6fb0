// src/models/prediction.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RentPredictionPayload {
    #[validate(length(min = 1, max = 100, message = "A cidade é obrigatória."))]
    pub city: String,
    #[validate(length(min = 1, max = 50, message = "O tipo do imóvel é obrigatório."))]
    pub property_type: String,
    #[validate(range(min = 0, max = 50, message = "Número de quartos inválido."))]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 50, message = "Número de banheiros inválido."))]
    pub bathrooms: i32,
    pub area: Option<Decimal>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentPrediction {
    pub estimated_rent: Decimal,
    pub min_range: Decimal,
    pub max_range: Decimal,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub market_insight: String,
}

impl RentPrediction {
    // Estimativa fixa devolvida quando a resposta do modelo não é utilizável
    pub fn fallback() -> Self {
        Self {
            estimated_rent: Decimal::from(25000),
            min_range: Decimal::from(20000),
            max_range: Decimal::from(35000),
            factors: vec!["Market average estimate".to_string()],
            market_insight: "Unable to provide detailed analysis. This is a baseline estimate."
                .to_string(),
        }
    }
}
