// src/clients/ai_gateway.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::common::error::AppError;

/// Motivo pelo qual a chamada ao modelo falhou.
#[derive(Debug)]
pub enum CompletionError {
    RateLimited,
    CreditsExhausted,
    // Timeout ou falha de rede
    Transport(String),
    // Status não-2xx diferente de 429/402
    Status(u16),
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::RateLimited => AppError::RateLimited,
            CompletionError::CreditsExhausted => AppError::CreditsExhausted,
            CompletionError::Transport(msg) => AppError::UpstreamError(msg),
            CompletionError::Status(code) => AppError::UpstreamError(format!("Gateway de IA respondeu {}", code)),
        }
    }
}

/// Chat completion compatível com a API da OpenAI.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Devolve o conteúdo da primeira escolha, se houver.
    async fn complete(&self, system: &str, user: &str) -> Result<Option<String>, CompletionError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct AiGatewayClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl AiGatewayClient {
    pub fn new(url: String, api_key: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url, api_key, model })
    }
}

#[async_trait]
impl CompletionClient for AiGatewayClient {
    async fn complete(&self, system: &str, user: &str) -> Result<Option<String>, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        });

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        match response.status().as_u16() {
            429 => return Err(CompletionError::RateLimited),
            402 => return Err(CompletionError::CreditsExhausted),
            code if !(200..300).contains(&code) => {
                let text = response.text().await.unwrap_or_default();
                tracing::error!("🔥 Gateway de IA respondeu {}: {}", code, text);
                return Err(CompletionError::Status(code));
            }
            _ => {}
        }

        // Corpo ilegível é tratado como "sem conteúdo"
        let parsed = match response.json::<ChatResponse>().await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Resposta do gateway de IA ilegível: {}", e);
                return Ok(None);
            }
        };

        Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content))
    }
}
