//! # Port Contracts
//!
//! Async traits the settlement flows are wired through.
//!
//! ## Two Sides of the Seam
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  STORAGE PORTS (return SettlementError)                                │
//! │  StockLedger, StockCatalog, PurchaseRecorder, PayoutStore,             │
//! │  AdminDirectory, ReconciliationFeed                                    │
//! │  Failures here are authoritative: the flow stops or compensates.       │
//! │                                                                         │
//! │  DOWNSTREAM PORTS (return DownstreamError)                             │
//! │  EventSink, StockCache, Notifier                                       │
//! │  Failures here are logged and swallowed: settled money and quantity    │
//! │  never roll back because an event log or cache was unreachable.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All traits are object-safe and consumed as `Arc<dyn T>`, so production
//! adapters and the in-memory implementations are interchangeable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::events::DomainEvent;
use stockroom_core::types::{
    AdminContact, MovementReason, Payout, PurchaseRecord, StockItem, StockMovement, StockPatch,
};

use crate::error::SettlementError;

// =============================================================================
// Downstream Error
// =============================================================================

/// Failure on the best-effort side (event log, cache, notification queue).
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// The call did not complete within its deadline.
    #[error("{op} timed out")]
    Timeout { op: String },

    /// The backing service rejected or dropped the call.
    #[error("{op} unavailable: {detail}")]
    Unavailable { op: String, detail: String },

    /// The payload could not be encoded for the wire.
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl DownstreamError {
    pub fn timeout(op: impl Into<String>) -> Self {
        DownstreamError::Timeout { op: op.into() }
    }

    pub fn unavailable(op: impl Into<String>, detail: impl Into<String>) -> Self {
        DownstreamError::Unavailable {
            op: op.into(),
            detail: detail.into(),
        }
    }
}

/// Result alias for downstream operations.
pub type DownstreamResult = Result<(), DownstreamError>;

// =============================================================================
// Storage Ports
// =============================================================================

/// Atomic quantity movements over the stock table.
///
/// Implementations must make `decrement` a single conditional update: check
/// the floor and subtract in one statement, and write the movement audit row
/// in the same transaction. Two racing decrements may interleave in any
/// order, but the quantity can never go below zero.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Removes `quantity` units if at least that many are on hand.
    ///
    /// Returns the post-decrement quantity. Fails with `InsufficientStock`
    /// (carrying the current availability) when the floor check loses, and
    /// `StockNotFound` when the item does not exist in the store.
    async fn decrement(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        order_reference: &str,
    ) -> Result<i64, SettlementError>;

    /// Adds `quantity` units and returns the post-increment quantity.
    ///
    /// `reason` and `reference` land in the movement audit row: rebalances
    /// reference the admin who topped up, reversals the order they undo.
    async fn increment(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        reason: MovementReason,
        reference: Option<&str>,
    ) -> Result<i64, SettlementError>;
}

/// Stock item CRUD, scoped by store.
#[async_trait]
pub trait StockCatalog: Send + Sync {
    /// Persists a fully-built stock item.
    async fn insert(&self, item: &StockItem) -> Result<(), SettlementError>;

    /// Fetches one item. `StockNotFound` covers both a missing ID and an ID
    /// that exists in a different store.
    async fn fetch(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError>;

    /// Lists every item in a store, most recently created first.
    async fn list_for_store(&self, store_id: &str) -> Result<Vec<StockItem>, SettlementError>;

    /// Lists every item across all stores, most recently created first.
    async fn list_all(&self) -> Result<Vec<StockItem>, SettlementError>;

    /// Applies a descriptive patch (name, price) and returns the updated row.
    async fn update_details(
        &self,
        store_id: &str,
        stock_id: &str,
        patch: &StockPatch,
    ) -> Result<StockItem, SettlementError>;

    /// Deletes an item and returns its final snapshot.
    async fn delete(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError>;
}

/// Earnings of an admin over a purchase window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEarnings {
    pub purchase_count: i64,
    pub gross_cents: i64,
}

/// The append-only purchase ledger.
#[async_trait]
pub trait PurchaseRecorder: Send + Sync {
    /// Inserts an immutable purchase record.
    ///
    /// Must fail with `DuplicateOrder` when a record with the same order
    /// reference already exists; the caller compensates the decrement.
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), SettlementError>;

    /// Looks a settled purchase up by its order reference.
    async fn find_by_order(
        &self,
        order_reference: &str,
    ) -> Result<Option<PurchaseRecord>, SettlementError>;

    /// Flips the confirmation flag after the email job is queued. The only
    /// mutable column on an otherwise immutable row.
    async fn mark_confirmation_sent(&self, purchase_id: &str) -> Result<(), SettlementError>;

    /// Sums purchases attributed to `admin_id` strictly after `after`
    /// (`None` means since forever).
    async fn window_earnings(
        &self,
        admin_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> Result<WindowEarnings, SettlementError>;
}

/// Payout rows and the subscription plan lookup that prices them.
#[async_trait]
pub trait PayoutStore: Send + Sync {
    /// Most recent payout for an admin, if any.
    async fn last_payout(&self, admin_id: &str) -> Result<Option<Payout>, SettlementError>;

    /// Persists a payout row.
    async fn insert(&self, payout: &Payout) -> Result<(), SettlementError>;

    /// The admin's active subscription plan ID, if they have one.
    async fn active_plan_id(&self, admin_id: &str) -> Result<Option<i64>, SettlementError>;

    /// Payout history, newest first.
    async fn history(&self, admin_id: &str) -> Result<Vec<Payout>, SettlementError>;
}

/// Narrow projection of the auth domain: enough to stamp event payloads and
/// route notifications, nothing more.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Contact details for an admin. `None` when the directory has no row;
    /// callers degrade rather than fail.
    async fn contact(&self, admin_id: &str) -> Result<Option<AdminContact>, SettlementError>;
}

/// Feed of purchase movements that never got a matching purchase record.
///
/// A movement is matched by a purchase row with the same order reference, or
/// by a reversal movement carrying that reference (the compensation path).
#[async_trait]
pub trait ReconciliationFeed: Send + Sync {
    /// Unmatched purchase movements older than `grace`.
    async fn unmatched_purchase_movements(
        &self,
        grace: chrono::Duration,
    ) -> Result<Vec<StockMovement>, SettlementError>;
}

// =============================================================================
// Downstream Ports
// =============================================================================

/// Append-only event log.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes one event to its topic.
    async fn publish(&self, event: &DomainEvent) -> DownstreamResult;
}

/// Listing cache keyed by the strings in [`cache_keys`].
#[async_trait]
pub trait StockCache: Send + Sync {
    /// Drops the given keys. Missing keys are not an error.
    async fn invalidate(&self, keys: &[String]) -> DownstreamResult;

    /// Reads a cached body, `None` on miss.
    async fn read(&self, key: &str) -> Result<Option<String>, DownstreamError>;

    /// Writes a body with a TTL.
    async fn write(&self, key: &str, body: &str, ttl: Duration) -> DownstreamResult;
}

/// What a notification is about. Serialized into the queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PurchaseConfirmation,
    LowStock,
}

/// A notification job for the out-of-process email worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    /// Customer ID for confirmations, admin email for low-stock notes. The
    /// worker owns address resolution.
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Hand-off to the notification queue.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, note: &Notification) -> DownstreamResult;
}

// =============================================================================
// Cache Keys
// =============================================================================

/// The cache key vocabulary shared with the read side.
pub mod cache_keys {
    /// Cross-store listing of all stocks.
    pub const ALL_STOCKS: &str = "stocks";

    /// Per-store stock listing.
    pub fn store_listing(store_id: &str) -> String {
        format!("stocks:{store_id}")
    }

    /// Store profile. Not touched by stock mutations; owned by store
    /// profile operations.
    pub fn store_profile(store_id: &str) -> String {
        format!("store:{store_id}")
    }

    /// The exact pair every stock mutation invalidates.
    pub fn listing_pair(store_id: &str) -> [String; 2] {
        [ALL_STOCKS.to_string(), store_listing(store_id)]
    }
}

// =============================================================================
// Port Bundle
// =============================================================================

/// Every port the services need, bundled for wiring.
///
/// Cloning is cheap: each field is an `Arc`.
#[derive(Clone)]
pub struct Ports {
    pub ledger: Arc<dyn StockLedger>,
    pub catalog: Arc<dyn StockCatalog>,
    pub recorder: Arc<dyn PurchaseRecorder>,
    pub payouts: Arc<dyn PayoutStore>,
    pub directory: Arc<dyn AdminDirectory>,
    pub events: Arc<dyn EventSink>,
    pub cache: Arc<dyn StockCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl Ports {
    /// Publishes an event, logging instead of failing. The best-effort side
    /// never bubbles.
    pub(crate) async fn emit(&self, event: DomainEvent) {
        if let Err(err) = self.events.publish(&event).await {
            tracing::warn!(topic = event.topic(), error = %err, "event publish failed");
        }
    }

    /// Queues a notification, logging instead of failing.
    pub(crate) async fn notify_logged(&self, note: Notification) {
        if let Err(err) = self.notifier.notify(&note).await {
            tracing::warn!(kind = ?note.kind, error = %err, "notification queueing failed");
        }
    }

    /// Drops the two listing keys for a store, logging instead of failing.
    pub(crate) async fn invalidate_listings(&self, store_id: &str) {
        if let Err(err) = self
            .cache
            .invalidate(&cache_keys::listing_pair(store_id))
            .await
        {
            tracing::warn!(store_id = %store_id, error = %err, "listing cache invalidation failed");
        }
    }

    /// Resolves the email stamped onto event payloads. Degrades to the admin
    /// ID when the directory cannot answer; payloads stay structurally
    /// complete either way.
    pub(crate) async fn admin_email(&self, admin_id: &str) -> String {
        match self.directory.contact(admin_id).await {
            Ok(Some(contact)) => contact.email,
            Ok(None) => {
                tracing::warn!(admin_id = %admin_id, "admin missing from directory");
                admin_id.to_string()
            }
            Err(err) => {
                tracing::warn!(admin_id = %admin_id, error = %err, "directory lookup failed");
                admin_id.to_string()
            }
        }
    }
}
