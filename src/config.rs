// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    clients::{AiGatewayClient, CompletionClient, Mailer, PaymentGateway, SmtpMailer, StripeClient},
    db::{
        AgreementRepository, BookingRepository, ConversationRepository, FavoriteRepository, KycRepository,
        NotificationRepository, PaymentRepository, PropertyRepository, StatsRepository, UserRepository,
    },
    services::{
        agreement_service::AgreementService, auth::AuthService, booking_service::BookingService,
        checkout_service::CheckoutService, favorite_service::FavoriteService, kyc_service::KycService,
        message_service::MessageService, notification_service::NotificationService,
        prediction_service::PredictionService, property_service::PropertyService, realtime::ChangeFeed,
        stats_service::StatsService, webhook_service::WebhookService,
    },
};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub app_base_url: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_api_base: String,
    // Sem SMTP_HOST os e-mails de visita são simplesmente pulados
    pub smtp: Option<SmtpConfig>,
    pub ai_gateway_url: Option<String>,
    pub ai_gateway_key: Option<String>,
    pub ai_model: String,
    pub fonts_dir: PathBuf,
    pub agreements_dir: PathBuf,
    pub stats_schedule_enabled: bool,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Variáveis vazias contam como ausentes
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: or("SMTP_PORT", "587").parse().context("SMTP_PORT inválida")?,
                username: or("SMTP_USER", ""),
                password: or("SMTP_PASSWORD", ""),
                from: or("SMTP_FROM", "RoadBed <onboarding@roadbed.app>"),
            }),
            None => None,
        };

        let http_timeout_secs: u64 = or("HTTP_TIMEOUT_SECS", "15")
            .parse()
            .context("HTTP_TIMEOUT_SECS deve ser um número de segundos")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            app_base_url: or("APP_BASE_URL", "http://localhost:5173").trim_end_matches('/').to_string(),
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base: or("STRIPE_API_BASE", "https://api.stripe.com"),
            smtp,
            ai_gateway_url: get("AI_GATEWAY_URL"),
            ai_gateway_key: get("AI_GATEWAY_KEY"),
            ai_model: or("AI_MODEL", "google/gemini-2.5-flash"),
            fonts_dir: PathBuf::from(or("FONTS_DIR", "./fonts")),
            agreements_dir: PathBuf::from(or("AGREEMENTS_DIR", "./storage/rent-agreements")),
            stats_schedule_enabled: or("STATS_SCHEDULE_ENABLED", "false").eq_ignore_ascii_case("true"),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub feed: ChangeFeed,
    pub auth_service: AuthService,
    pub property_service: PropertyService,
    pub booking_service: BookingService,
    pub checkout_service: CheckoutService,
    pub webhook_service: WebhookService,
    pub message_service: MessageService,
    pub notification_service: NotificationService,
    pub favorite_service: FavoriteService,
    pub kyc_service: KycService,
    pub stats_service: StatsService,
    pub prediction_service: PredictionService,
    pub agreement_service: AgreementService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::build(config, db_pool)
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(config: &Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let feed = ChangeFeed::new();

        let user_repo = UserRepository::new(db_pool.clone());
        let roles = Arc::new(user_repo.clone());
        let bookings = Arc::new(BookingRepository::new(db_pool.clone()));
        let payments = Arc::new(PaymentRepository::new(db_pool.clone()));
        let notifications = Arc::new(NotificationRepository::new(db_pool.clone()));
        let conversations = Arc::new(ConversationRepository::new(db_pool.clone()));
        let stats = Arc::new(StatsRepository::new(db_pool.clone()));

        let gateway: Option<Arc<dyn PaymentGateway>> = match &config.stripe_secret_key {
            Some(key) => Some(Arc::new(StripeClient::new(
                config.stripe_api_base.clone(),
                key.clone(),
                config.http_timeout,
            )?)),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY ausente: checkout desabilitado");
                None
            }
        };

        let mailer: Option<Arc<dyn Mailer>> = match &config.smtp {
            Some(smtp) => Some(Arc::new(SmtpMailer::new(
                &smtp.host,
                smtp.port,
                &smtp.username,
                &smtp.password,
                &smtp.from,
            )?)),
            None => {
                tracing::warn!("SMTP_HOST ausente: e-mails de visita serão pulados");
                None
            }
        };

        let completion: Option<Arc<dyn CompletionClient>> =
            match (&config.ai_gateway_url, &config.ai_gateway_key) {
                (Some(url), Some(key)) => Some(Arc::new(AiGatewayClient::new(
                    url.clone(),
                    key.clone(),
                    config.ai_model.clone(),
                    config.http_timeout,
                )?)),
                _ => {
                    tracing::warn!("AI_GATEWAY_URL/AI_GATEWAY_KEY ausentes: previsão de aluguel indisponível");
                    None
                }
            };

        Ok(Self {
            auth_service: AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone()),
            property_service: PropertyService::new(
                Arc::new(PropertyRepository::new(db_pool.clone())),
                roles.clone(),
                feed.clone(),
            ),
            booking_service: BookingService::new(bookings.clone(), mailer, feed.clone()),
            checkout_service: CheckoutService::new(
                bookings.clone(),
                payments.clone(),
                gateway,
                config.app_base_url.clone(),
                feed.clone(),
            ),
            webhook_service: WebhookService::new(
                bookings,
                payments,
                notifications.clone(),
                config.stripe_webhook_secret.clone(),
                feed.clone(),
            ),
            message_service: MessageService::new(conversations, notifications.clone(), feed.clone()),
            notification_service: NotificationService::new(notifications.clone()),
            favorite_service: FavoriteService::new(Arc::new(FavoriteRepository::new(db_pool.clone()))),
            kyc_service: KycService::new(KycRepository::new(db_pool.clone()), notifications, feed.clone()),
            stats_service: StatsService::new(stats),
            prediction_service: PredictionService::new(completion),
            agreement_service: AgreementService::new(
                Arc::new(AgreementRepository::new(db_pool.clone())),
                roles,
                config.fonts_dir.clone(),
                config.agreements_dir.clone(),
                config.app_base_url.clone(),
            ),
            feed,
            db_pool,
        })
    }
}
