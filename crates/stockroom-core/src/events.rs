//! # Event Log Payloads
//!
//! Topics and flat payload types for the append-only event log.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Topic          │ Payload                                               │
//! │  ───────────────┼───────────────────────────────────────────────────    │
//! │  stock-events   │ { event, id, name, quantity, store_id,                │
//! │                 │   admin_email, timestamp }                            │
//! │  stock-alerts   │ { type: "LOW_STOCK", id, name, quantity, store_id,    │
//! │                 │   admin_email, timestamp }                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payloads are intentionally flat JSON objects. `quantity` is always the
//! post-operation quantity and `timestamp` is ISO-8601 UTC. Consumers are
//! external analytics and alerting pipelines, so field names here are a wire
//! contract, not an implementation detail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::AlertKind;
use crate::types::StockItem;

/// Topic carrying stock lifecycle and purchase events.
pub const TOPIC_STOCK_EVENTS: &str = "stock-events";

/// Topic carrying low-stock alerts.
pub const TOPIC_STOCK_ALERTS: &str = "stock-alerts";

// =============================================================================
// Stock Events
// =============================================================================

/// Discriminator for stock lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEventKind {
    #[serde(rename = "stock-added")]
    Added,
    #[serde(rename = "stock-updated")]
    Updated,
    #[serde(rename = "stock-removed")]
    Removed,
    #[serde(rename = "stock-purchased")]
    Purchased,
}

impl StockEventKind {
    /// Stable wire label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockEventKind::Added => "stock-added",
            StockEventKind::Updated => "stock-updated",
            StockEventKind::Removed => "stock-removed",
            StockEventKind::Purchased => "stock-purchased",
        }
    }
}

/// A stock lifecycle or purchase event on the `stock-events` topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEvent {
    pub event: StockEventKind,
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub store_id: String,
    pub admin_email: String,
    pub timestamp: DateTime<Utc>,
}

impl StockEvent {
    /// Builds an event from a stock snapshot and the post-operation quantity.
    pub fn from_snapshot(
        kind: StockEventKind,
        stock: &StockItem,
        quantity: i64,
        admin_email: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        StockEvent {
            event: kind,
            id: stock.id.clone(),
            name: stock.name.clone(),
            quantity,
            store_id: stock.store_id.clone(),
            admin_email: admin_email.into(),
            timestamp: at,
        }
    }
}

// =============================================================================
// Stock Alerts
// =============================================================================

/// A low-stock alert on the `stock-alerts` topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub store_id: String,
    pub admin_email: String,
    pub timestamp: DateTime<Utc>,
}

impl StockAlert {
    /// Builds a low-stock alert from a stock snapshot and the quantity that
    /// tripped the threshold.
    pub fn low_stock(
        stock: &StockItem,
        quantity: i64,
        admin_email: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        StockAlert {
            kind: AlertKind::LowStock,
            id: stock.id.clone(),
            name: stock.name.clone(),
            quantity,
            store_id: stock.store_id.clone(),
            admin_email: admin_email.into(),
            timestamp: at,
        }
    }
}

// =============================================================================
// Domain Event
// =============================================================================

/// Any message destined for the event log. Serializes untagged, so the wire
/// payload is exactly the inner flat object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Stock(StockEvent),
    Alert(StockAlert),
}

impl DomainEvent {
    /// The topic this event belongs on.
    pub const fn topic(&self) -> &'static str {
        match self {
            DomainEvent::Stock(_) => TOPIC_STOCK_EVENTS,
            DomainEvent::Alert(_) => TOPIC_STOCK_ALERTS,
        }
    }
}

impl From<StockEvent> for DomainEvent {
    fn from(event: StockEvent) -> Self {
        DomainEvent::Stock(event)
    }
}

impl From<StockAlert> for DomainEvent {
    fn from(alert: StockAlert) -> Self {
        DomainEvent::Alert(alert)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_stock() -> StockItem {
        StockItem {
            id: "stk-1".to_string(),
            store_id: "store-1".to_string(),
            admin_id: "adm-1".to_string(),
            name: "Espresso Beans 1kg".to_string(),
            quantity: 12,
            price_cents: 5000,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_event_payload_shape() {
        let stock = sample_stock();
        let event = StockEvent::from_snapshot(
            StockEventKind::Purchased,
            &stock,
            9,
            "owner@example.com",
            Utc::now(),
        );
        let json = serde_json::to_value(DomainEvent::from(event)).unwrap();

        assert_eq!(json["event"], "stock-purchased");
        assert_eq!(json["id"], "stk-1");
        assert_eq!(json["quantity"], 9);
        assert_eq!(json["store_id"], "store-1");
        assert_eq!(json["admin_email"], "owner@example.com");
        // Untagged: no wrapper key leaks into the payload
        assert!(json.get("Stock").is_none());
    }

    #[test]
    fn test_alert_payload_shape() {
        let stock = sample_stock();
        let alert = StockAlert::low_stock(&stock, 9, "owner@example.com", Utc::now());
        let json = serde_json::to_value(DomainEvent::from(alert)).unwrap();

        assert_eq!(json["type"], "LOW_STOCK");
        assert_eq!(json["quantity"], 9);
        assert_eq!(json["name"], "Espresso Beans 1kg");
    }

    #[test]
    fn test_topic_routing() {
        let stock = sample_stock();
        let event: DomainEvent =
            StockEvent::from_snapshot(StockEventKind::Added, &stock, 12, "a@b.c", Utc::now())
                .into();
        let alert: DomainEvent = StockAlert::low_stock(&stock, 9, "a@b.c", Utc::now()).into();

        assert_eq!(event.topic(), TOPIC_STOCK_EVENTS);
        assert_eq!(alert.topic(), TOPIC_STOCK_ALERTS);
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let stock = sample_stock();
        let event =
            StockEvent::from_snapshot(StockEventKind::Updated, &stock, 15, "a@b.c", Utc::now());
        let json = serde_json::to_value(event).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z') || ts.contains('+'));
    }
}
