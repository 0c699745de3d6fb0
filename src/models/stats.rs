// src/models/stats.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Tipos de evento contados pelo agregador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedEvent {
    PageView,
    Inquiry,
}

impl TrackedEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedEvent::PageView => "page_view",
            TrackedEvent::Inquiry => "inquiry",
        }
    }
}

// Uma linha por (owner, property, date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStat {
    pub owner_id: Uuid,
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub views: i32,
    pub inquiries: i32,
    pub bookings: i32,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct PropertyOwner {
    pub id: Uuid,
    pub owner_id: Uuid,
}

// Intervalo semiaberto [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    // Janela do dia anterior a `today` (UTC)
    pub fn previous_day(today: NaiveDate) -> Option<Self> {
        let day = today.pred_opt()?;
        Some(Self {
            day,
            start: day.and_hms_opt(0, 0, 0)?.and_utc(),
            end: today.and_hms_opt(0, 0, 0)?.and_utc(),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregationReport {
    pub success: bool,
    pub processed: usize,
    pub failed: usize,
}

// POST /api/events
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventPayload {
    pub event_type: TrackedEvent,
    pub property_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerStatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct StatTotals {
    pub views: i64,
    pub inquiries: i64,
    pub bookings: i64,
}

#[derive(Debug, Serialize)]
pub struct OwnerStatsResponse {
    pub stats: Vec<OwnerStat>,
    pub totals: StatTotals,
}
