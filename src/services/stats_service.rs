// src/services/stats_service.rs

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StatsStore,
    models::stats::{
        AggregationReport, DayWindow, OwnerStat, OwnerStatsResponse, PropertyOwner, StatTotals, TrackEventPayload,
        TrackedEvent,
    },
};

pub const DEFAULT_STATS_DAYS: i64 = 30;
pub const MAX_STATS_DAYS: i64 = 365;

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn StatsStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    /// Agrega o dia anterior a `today` (UTC) para todos os imóveis.
    /// Um imóvel com falha é registrado e pulado; os demais seguem.
    pub async fn aggregate_day(&self, today: NaiveDate) -> Result<AggregationReport, AppError> {
        let window = DayWindow::previous_day(today)
            .ok_or_else(|| AppError::InvalidInput("Data fora do intervalo suportado.".into()))?;

        tracing::info!("Agregando estatísticas de {}", window.day);

        let properties = self.store.list_property_owners().await?;
        let mut processed = 0;
        let mut failed = 0;

        for property in &properties {
            match self.aggregate_property(property, &window).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Falha ao agregar o imóvel {}: {}", property.id, e);
                }
            }
        }

        tracing::info!("✅ Agregação concluída: {} ok, {} com falha", processed, failed);
        Ok(AggregationReport { success: true, processed, failed })
    }

    pub async fn aggregate_yesterday(&self) -> Result<AggregationReport, AppError> {
        self.aggregate_day(Utc::now().date_naive()).await
    }

    async fn aggregate_property(&self, property: &PropertyOwner, window: &DayWindow) -> Result<(), AppError> {
        let views = self.store.count_events(property.id, TrackedEvent::PageView, window).await?;
        let inquiries = self.store.count_events(property.id, TrackedEvent::Inquiry, window).await?;
        let bookings = self.store.count_bookings(property.id, window).await?;

        let stat = OwnerStat {
            owner_id: property.owner_id,
            property_id: property.id,
            date: window.day,
            views: clamp_count(views),
            inquiries: clamp_count(inquiries),
            bookings: clamp_count(bookings),
        };

        self.store.upsert_owner_stat(&stat).await
    }

    pub async fn track_event(&self, user_id: Option<Uuid>, payload: TrackEventPayload) -> Result<(), AppError> {
        self.store
            .record_event(payload.event_type, payload.property_id, user_id, payload.metadata)
            .await
    }

    pub async fn owner_stats(&self, owner_id: Uuid, days: Option<i64>) -> Result<OwnerStatsResponse, AppError> {
        let days = days.unwrap_or(DEFAULT_STATS_DAYS).clamp(1, MAX_STATS_DAYS);
        let since = Utc::now().date_naive() - Duration::days(days);

        let stats = self.store.list_for_owner(owner_id, since).await?;
        let totals = stats.iter().fold(StatTotals::default(), |mut acc, s| {
            acc.views += i64::from(s.views);
            acc.inquiries += i64::from(s.inquiries);
            acc.bookings += i64::from(s.bookings);
            acc
        });

        Ok(OwnerStatsResponse { stats, totals })
    }
}

fn clamp_count(count: i64) -> i32 {
    i32::try_from(count.max(0)).unwrap_or(i32::MAX)
}

/// Executa a agregação uma vez por dia, logo após a meia-noite UTC.
pub fn spawn_daily(service: StatsService) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next_run = (now.date_naive() + Duration::days(1))
                .and_hms_opt(0, 5, 0)
                .map(|t| t.and_utc())
                .unwrap_or(now + Duration::hours(24));
            let wait = (next_run - now).to_std().unwrap_or(std::time::Duration::from_secs(60));

            tracing::info!("Próxima agregação de estatísticas em {}", next_run);
            tokio::time::sleep(wait).await;

            if let Err(e) = service.aggregate_yesterday().await {
                tracing::error!("🔥 Falha na agregação diária: {}", e);
            }
        }
    })
}
