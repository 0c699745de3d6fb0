// src/services/prediction_service.rs

use std::sync::Arc;

use crate::{
    clients::{CompletionClient, CompletionError},
    common::error::AppError,
    models::prediction::{RentPrediction, RentPredictionPayload},
};

const SYSTEM_PROMPT: &str =
    "You are a helpful real estate pricing assistant. Always respond with valid JSON only.";

#[derive(Clone)]
pub struct PredictionService {
    client: Option<Arc<dyn CompletionClient>>,
}

impl PredictionService {
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    /// Sempre devolve um número para a UI: resposta ilegível, timeout ou falha de rede
    /// caem na estimativa fixa. 429/402 e demais status são repassados como erro.
    pub async fn predict(&self, payload: &RentPredictionPayload) -> Result<RentPrediction, AppError> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("AI_GATEWAY_KEY não configurada"))
        })?;

        let content = match client.complete(SYSTEM_PROMPT, &build_prompt(payload)).await {
            Ok(content) => content,
            Err(CompletionError::Transport(e)) => {
                tracing::warn!("Gateway de IA inacessível, usando estimativa padrão: {}", e);
                return Ok(RentPrediction::fallback());
            }
            Err(e) => return Err(e.into()),
        };

        let Some(content) = content else {
            tracing::warn!("Gateway de IA respondeu sem conteúdo");
            return Ok(RentPrediction::fallback());
        };

        Ok(parse_prediction(&content).unwrap_or_else(|| {
            tracing::warn!("Resposta da IA não é JSON válido: {}", content);
            RentPrediction::fallback()
        }))
    }
}

pub(crate) fn build_prompt(payload: &RentPredictionPayload) -> String {
    let area = payload
        .area
        .map(|a| a.normalize().to_string())
        .unwrap_or_else(|| "undefined".to_string());
    let amenities = if payload.amenities.is_empty() {
        "None specified".to_string()
    } else {
        payload.amenities.join(", ")
    };
    let city = &payload.city;

    format!(
        r#"You are a real estate pricing expert for Indian rental properties. Based on the following property details, provide an accurate rent estimate in INR (Indian Rupees).

Property Details:
- City: {city}
- Property Type: {property_type}
- Bedrooms: {bedrooms}
- Bathrooms: {bathrooms}
- Area: {area} sq ft
- Amenities: {amenities}

Consider these factors:
1. Current market rates in {city}
2. Property size and configuration
3. Available amenities
4. Location tier (metro vs non-metro)

Respond with a JSON object containing:
{{
  "estimatedRent": <number in INR>,
  "minRange": <minimum expected rent>,
  "maxRange": <maximum expected rent>,
  "factors": [<list of factors affecting the price>],
  "marketInsight": "<brief market insight for this property type in this city>"
}}

Only respond with valid JSON, no other text."#,
        property_type = payload.property_type,
        bedrooms = payload.bedrooms,
        bathrooms = payload.bathrooms,
    )
}

// Remove a cerca ```json ... ``` se houver; senão pega do primeiro '{' ao último '}'
fn extract_json(content: &str) -> &str {
    if let Some(start) = content.find("```json") {
        let rest = &content[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content.trim(),
    }
}

pub(crate) fn parse_prediction(content: &str) -> Option<RentPrediction> {
    serde_json::from_str(extract_json(content)).ok()
}
