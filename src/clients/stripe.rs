// src/clients/stripe.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::common::error::AppError;

// Dados para abrir uma sessão de checkout hospedado
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub customer_id: String,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub amount: i64, // unidades inteiras da moeda
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Provedor de pagamentos (clientes + sessões de checkout).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reaproveita o cliente com este e-mail ou cria um novo.
    async fn find_or_create_customer(&self, email: &str, user_id: Uuid) -> Result<String, AppError>;

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, AppError>;
}

#[derive(Deserialize)]
struct CustomerList {
    data: Vec<Customer>,
}

#[derive(Deserialize)]
struct Customer {
    id: String,
}

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(api_base: String, secret_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    async fn send<T: for<'de> Deserialize<'de>>(&self, request: reqwest::RequestBuilder) -> Result<T, AppError> {
        let response = request
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Stripe indisponível: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("🔥 Stripe respondeu {}: {}", status, body);
            return Err(AppError::UpstreamError(format!("Stripe respondeu {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Resposta inválida do Stripe: {}", e)))
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn find_or_create_customer(&self, email: &str, user_id: Uuid) -> Result<String, AppError> {
        // Listar e depois criar não é atômico: duas chamadas simultâneas podem criar dois clientes.
        let existing: CustomerList = self
            .send(
                self.http
                    .get(format!("{}/v1/customers", self.api_base))
                    .query(&[("email", email), ("limit", "1")]),
            )
            .await?;

        if let Some(customer) = existing.data.into_iter().next() {
            return Ok(customer.id);
        }

        let user_id = user_id.to_string();
        let created: Customer = self
            .send(
                self.http
                    .post(format!("{}/v1/customers", self.api_base))
                    .form(&[("email", email), ("metadata[user_id]", user_id.as_str())]),
            )
            .await?;

        tracing::info!("✅ Cliente Stripe criado: {}", created.id);
        Ok(created.id)
    }

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, AppError> {
        // O Stripe trabalha na menor unidade da moeda (paise para INR)
        let unit_amount = request
            .amount
            .checked_mul(100)
            .ok_or_else(|| AppError::InvalidInput("Valor fora do intervalo permitido.".into()))?;

        let form: Vec<(&str, String)> = vec![
            ("customer", request.customer_id.clone()),
            ("line_items[0][price_data][currency]", request.currency.to_lowercase()),
            ("line_items[0][price_data][product_data][name]", request.product_name.clone()),
            (
                "line_items[0][price_data][product_data][description]",
                format!("Booking ID: {}", request.booking_id),
            ),
            ("line_items[0][price_data][unit_amount]", unit_amount.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("mode", "payment".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[booking_id]", request.booking_id.to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
        ];

        self.send(
            self.http
                .post(format!("{}/v1/checkout/sessions", self.api_base))
                .form(&form),
        )
        .await
    }
}
