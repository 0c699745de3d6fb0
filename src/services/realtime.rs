// src/services/realtime.rs

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

// Uma mudança de linha publicada após a escrita no banco
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub table: &'static str,
    pub event_type: ChangeKind,
    pub owner_id: Option<Uuid>,
    pub record: Value,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(table: &'static str, event_type: ChangeKind, owner_id: Option<Uuid>, record: &T) -> Self {
        Self {
            table,
            event_type,
            owner_id,
            record: serde_json::to_value(record).unwrap_or(Value::Null),
        }
    }

    /// Tabelas públicas chegam a todos; as demais só ao dono da linha.
    pub fn visible_to(&self, table: &str, user_id: Uuid) -> bool {
        if self.table != table {
            return false;
        }
        self.table == "properties" || self.owner_id == Some(user_id)
    }
}

/// Canal em memória de mudanças de linhas (publish/subscribe por tabela).
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    // Sem assinantes o envio falha; isso não é erro
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();
        let owner = Uuid::new_v4();

        feed.publish(ChangeEvent::new("notifications", ChangeKind::Insert, Some(owner), &json!({"title": "Oi"})));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, "notifications");
        assert_eq!(event.event_type, ChangeKind::Insert);
        assert_eq!(event.record["title"], "Oi");
    }

    #[test]
    fn private_tables_are_filtered_by_owner() {
        let owner = Uuid::new_v4();
        let event = ChangeEvent::new("bookings", ChangeKind::Update, Some(owner), &json!({}));

        assert!(event.visible_to("bookings", owner));
        assert!(!event.visible_to("bookings", Uuid::new_v4()));
        assert!(!event.visible_to("payments", owner));
    }

    #[test]
    fn properties_table_is_public() {
        let event = ChangeEvent::new("properties", ChangeKind::Insert, Some(Uuid::new_v4()), &json!({}));
        assert!(event.visible_to("properties", Uuid::new_v4()));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let feed = ChangeFeed::new();
        feed.publish(ChangeEvent::new("messages", ChangeKind::Insert, None, &json!({})));
    }
}
