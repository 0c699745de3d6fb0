//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod clients;
mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;
#[cfg(test)]
mod testing;

use crate::config::{AppState, Config};
use crate::middleware::auth::auth_guard;
use crate::services::stats_service::spawn_daily;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if config.stats_schedule_enabled {
        spawn_daily(app_state.stats_service.clone());
        tracing::info!("Agregação diária de estatísticas agendada");
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas (webhook e realtime se autenticam sozinhos)
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/properties", get(handlers::properties::search_properties))
        .route("/properties/{id}", get(handlers::properties::get_property))
        .route("/events", post(handlers::stats::track_event))
        .route("/webhooks/stripe", post(handlers::payments::stripe_webhook))
        .route("/realtime", get(handlers::realtime::realtime_socket));

    // Rotas protegidas pelo middleware de autenticação
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        // Imóveis
        .route("/properties", post(handlers::properties::create_property))
        .route("/properties/{id}", put(handlers::properties::update_property))
        .route("/properties/{id}/status", patch(handlers::properties::update_property_status))
        .route("/owner/properties", get(handlers::properties::list_owner_properties))
        .route("/owner/bookings", get(handlers::bookings::list_owner_bookings))
        .route("/owner/stats", get(handlers::stats::owner_stats))
        // Visitas e pagamentos
        .route("/bookings", get(handlers::bookings::list_my_bookings))
        .route("/bookings/visit", post(handlers::bookings::book_visit))
        .route("/bookings/{id}", delete(handlers::bookings::cancel_booking))
        .route("/payments", get(handlers::payments::list_payments))
        .route("/payments/checkout", post(handlers::payments::create_checkout))
        // Mensagens
        .route(
            "/conversations",
            post(handlers::messaging::create_conversation).get(handlers::messaging::list_conversations),
        )
        .route(
            "/conversations/{id}/messages",
            get(handlers::messaging::list_messages).post(handlers::messaging::post_message),
        )
        .route("/conversations/{id}/read", post(handlers::messaging::mark_conversation_read))
        .route("/messages", post(handlers::messaging::send_message))
        // Notificações
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/{id}/read", patch(handlers::notifications::mark_notification_read))
        .route("/notifications/read-all", post(handlers::notifications::mark_all_notifications_read))
        // Favoritos e buscas salvas
        .route(
            "/favorites",
            get(handlers::favorites::list_favorites).post(handlers::favorites::add_favorite),
        )
        .route("/favorites/{property_id}", delete(handlers::favorites::remove_favorite))
        .route(
            "/saved-searches",
            get(handlers::favorites::list_saved_searches).post(handlers::favorites::create_saved_search),
        )
        .route("/saved-searches/{id}", delete(handlers::favorites::delete_saved_search))
        // KYC
        .route("/kyc", get(handlers::kyc::list_my_kyc).post(handlers::kyc::submit_kyc))
        .route("/admin/kyc", get(handlers::kyc::list_pending_kyc))
        .route("/admin/kyc/{id}/approve", post(handlers::kyc::approve_kyc))
        .route("/admin/kyc/{id}/reject", post(handlers::kyc::reject_kyc))
        .route("/admin/stats/aggregate", post(handlers::stats::run_aggregation))
        // IA e contratos
        .route("/predictions/rent", post(handlers::predictions::predict_rent))
        .route("/agreements", post(handlers::agreements::generate_agreement))
        .route("/agreements/{id}/document", get(handlers::agreements::download_agreement))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
