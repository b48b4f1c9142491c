//! # In-Memory Adapters
//!
//! Complete port implementations backed by std collections. Used by the
//! integration tests and by local development wiring; the flows cannot tell
//! them apart from the production adapters.
//!
//! The downstream fakes record every call and carry a `set_fail` switch, so
//! tests can prove the best-effort side really is best-effort.
//!
//! Locks are plain `std::sync::Mutex` held only across synchronous sections,
//! never across an await.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use stockroom_core::error::CoreError;
use stockroom_core::events::DomainEvent;
use stockroom_core::types::{
    AdminContact, MovementReason, Payout, PurchaseRecord, StockItem, StockMovement, StockPatch,
};

use crate::contracts::{
    AdminDirectory, DownstreamError, DownstreamResult, EventSink, Notification, Notifier,
    PayoutStore, Ports, PurchaseRecorder, ReconciliationFeed, StockCache, StockCatalog,
    StockLedger, WindowEarnings,
};
use crate::error::SettlementError;

// =============================================================================
// Stock Store
// =============================================================================

#[derive(Default)]
struct StockInner {
    stocks: HashMap<String, StockItem>,
    movements: Vec<StockMovement>,
}

/// In-memory stock table plus its movement audit trail.
///
/// Implements both [`StockCatalog`] and [`StockLedger`]; holding one lock
/// across the quantity change and the movement append gives the same
/// atomicity the production store gets from a transaction.
#[derive(Clone, Default)]
pub struct MemoryStockStore {
    inner: Arc<Mutex<StockInner>>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a stock item directly, bypassing validation.
    pub fn seed(&self, item: StockItem) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stocks
            .insert(item.id.clone(), item);
    }

    /// Current quantity of an item, if it exists.
    pub fn quantity_of(&self, stock_id: &str) -> Option<i64> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stocks
            .get(stock_id)
            .map(|s| s.quantity)
    }

    /// Every movement written so far, in order.
    pub fn movements(&self) -> Vec<StockMovement> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .movements
            .clone()
    }
}

#[async_trait]
impl StockCatalog for MemoryStockStore {
    async fn insert(&self, item: &StockItem) -> Result<(), SettlementError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.stocks.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn fetch(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .stocks
            .get(stock_id)
            .filter(|s| s.store_id == store_id)
            .cloned()
            .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id).into())
    }

    async fn list_for_store(&self, store_id: &str) -> Result<Vec<StockItem>, SettlementError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut items: Vec<StockItem> = inner
            .stocks
            .values()
            .filter(|s| s.store_id == store_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_all(&self) -> Result<Vec<StockItem>, SettlementError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut items: Vec<StockItem> = inner.stocks.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update_details(
        &self,
        store_id: &str,
        stock_id: &str,
        patch: &StockPatch,
    ) -> Result<StockItem, SettlementError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let item = inner
            .stocks
            .get_mut(stock_id)
            .filter(|s| s.store_id == store_id)
            .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id))?;
        if let Some(name) = &patch.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = patch.price_cents {
            item.price_cents = price;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let in_store = inner
            .stocks
            .get(stock_id)
            .is_some_and(|s| s.store_id == store_id);
        if !in_store {
            return Err(CoreError::stock_not_found(store_id, stock_id).into());
        }
        inner
            .stocks
            .remove(stock_id)
            .ok_or_else(|| SettlementError::storage("stock vanished during delete"))
    }
}

#[async_trait]
impl StockLedger for MemoryStockStore {
    async fn decrement(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        order_reference: &str,
    ) -> Result<i64, SettlementError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let after = {
            let item = inner
                .stocks
                .get_mut(stock_id)
                .filter(|s| s.store_id == store_id)
                .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id))?;
            if item.quantity < quantity {
                return Err(CoreError::InsufficientStock {
                    stock_id: stock_id.to_string(),
                    available: item.quantity,
                    requested: quantity,
                }
                .into());
            }
            item.quantity -= quantity;
            item.updated_at = Utc::now();
            item.quantity
        };
        inner.movements.push(StockMovement {
            id: Uuid::new_v4().to_string(),
            stock_id: stock_id.to_string(),
            store_id: store_id.to_string(),
            delta: -quantity,
            quantity_after: after,
            reason: MovementReason::Purchase,
            reference: Some(order_reference.to_string()),
            occurred_at: Utc::now(),
        });
        Ok(after)
    }

    async fn increment(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        reason: MovementReason,
        reference: Option<&str>,
    ) -> Result<i64, SettlementError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let after = {
            let item = inner
                .stocks
                .get_mut(stock_id)
                .filter(|s| s.store_id == store_id)
                .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id))?;
            item.quantity += quantity;
            item.updated_at = Utc::now();
            item.quantity
        };
        inner.movements.push(StockMovement {
            id: Uuid::new_v4().to_string(),
            stock_id: stock_id.to_string(),
            store_id: store_id.to_string(),
            delta: quantity,
            quantity_after: after,
            reason,
            reference: reference.map(str::to_string),
            occurred_at: Utc::now(),
        });
        Ok(after)
    }
}

// =============================================================================
// Purchase Store
// =============================================================================

/// In-memory purchase ledger with the unique order reference constraint.
#[derive(Clone, Default)]
pub struct MemoryPurchaseStore {
    records: Arc<Mutex<Vec<PurchaseRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `record` and `mark_confirmation_sent` fail with a storage
    /// error. Reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inserts a record directly, bypassing the duplicate check.
    pub fn seed(&self, record: PurchaseRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    /// Every record written so far.
    pub fn records(&self) -> Vec<PurchaseRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True when a record with this order reference exists.
    pub fn has_order(&self, order_reference: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|r| r.order_reference == order_reference)
    }
}

#[async_trait]
impl PurchaseRecorder for MemoryPurchaseStore {
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), SettlementError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SettlementError::storage("purchase ledger offline"));
        }
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records
            .iter()
            .any(|r| r.order_reference == purchase.order_reference)
        {
            return Err(CoreError::DuplicateOrder(purchase.order_reference.clone()).into());
        }
        records.push(purchase.clone());
        Ok(())
    }

    async fn find_by_order(
        &self,
        order_reference: &str,
    ) -> Result<Option<PurchaseRecord>, SettlementError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.order_reference == order_reference)
            .cloned())
    }

    async fn mark_confirmation_sent(&self, purchase_id: &str) -> Result<(), SettlementError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SettlementError::storage("purchase ledger offline"));
        }
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.iter_mut().find(|r| r.id == purchase_id) {
            Some(record) => {
                record.confirmation_sent = true;
                Ok(())
            }
            None => Err(SettlementError::storage(format!(
                "purchase {purchase_id} not found"
            ))),
        }
    }

    async fn window_earnings(
        &self,
        admin_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> Result<WindowEarnings, SettlementError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut purchase_count = 0;
        let mut gross_cents = 0;
        for record in records.iter().filter(|r| r.admin_id == admin_id) {
            // Strictly after: purchases at exactly the last paid_at were
            // already covered by that payout.
            if after.map_or(true, |bound| record.purchased_at > bound) {
                purchase_count += 1;
                gross_cents += record.total_cents;
            }
        }
        Ok(WindowEarnings {
            purchase_count,
            gross_cents,
        })
    }
}

// =============================================================================
// Payout Store
// =============================================================================

#[derive(Default)]
struct PayoutInner {
    payouts: Vec<Payout>,
    plans: HashMap<String, i64>,
}

/// In-memory payout rows plus the active-plan lookup.
#[derive(Clone, Default)]
pub struct MemoryPayoutStore {
    inner: Arc<Mutex<PayoutInner>>,
}

impl MemoryPayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the admin's active subscription plan.
    pub fn set_plan(&self, admin_id: &str, plan_id: i64) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .plans
            .insert(admin_id.to_string(), plan_id);
    }

    /// Inserts a payout directly.
    pub fn seed(&self, payout: Payout) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .payouts
            .push(payout);
    }
}

#[async_trait]
impl PayoutStore for MemoryPayoutStore {
    async fn last_payout(&self, admin_id: &str) -> Result<Option<Payout>, SettlementError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .payouts
            .iter()
            .filter(|p| p.admin_id == admin_id)
            .max_by_key(|p| p.paid_at)
            .cloned())
    }

    async fn insert(&self, payout: &Payout) -> Result<(), SettlementError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .payouts
            .push(payout.clone());
        Ok(())
    }

    async fn active_plan_id(&self, admin_id: &str) -> Result<Option<i64>, SettlementError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .plans
            .get(admin_id)
            .copied())
    }

    async fn history(&self, admin_id: &str) -> Result<Vec<Payout>, SettlementError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut payouts: Vec<Payout> = inner
            .payouts
            .iter()
            .filter(|p| p.admin_id == admin_id)
            .cloned()
            .collect();
        payouts.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payouts)
    }
}

// =============================================================================
// Admin Directory
// =============================================================================

/// In-memory admin contact lookup.
#[derive(Clone, Default)]
pub struct MemoryAdminDirectory {
    contacts: Arc<Mutex<HashMap<String, AdminContact>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryAdminDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, contact: AdminContact) {
        self.contacts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(contact.id.clone(), contact);
    }

    /// When set, every lookup fails with a storage error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AdminDirectory for MemoryAdminDirectory {
    async fn contact(&self, admin_id: &str) -> Result<Option<AdminContact>, SettlementError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SettlementError::storage("directory offline"));
        }
        Ok(self
            .contacts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(admin_id)
            .cloned())
    }
}

// =============================================================================
// Recording Event Sink
// =============================================================================

/// One event captured by [`RecordingEventSink`].
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub topic: &'static str,
    pub payload: Value,
}

/// Event sink that records what it is asked to publish.
#[derive(Clone, Default)]
pub struct RecordingEventSink {
    published: Arc<Mutex<Vec<PublishedEvent>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every publish fails as unavailable.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every captured event, in publish order.
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Payloads published to one topic, in order.
    pub fn on_topic(&self, topic: &str) -> Vec<Value> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload.clone())
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, event: &DomainEvent) -> DownstreamResult {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DownstreamError::unavailable("publish", "sink offline"));
        }
        let payload =
            serde_json::to_value(event).map_err(|e| DownstreamError::Encoding(e.to_string()))?;
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedEvent {
                topic: event.topic(),
                payload,
            });
        Ok(())
    }
}

// =============================================================================
// Stock Cache
// =============================================================================

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, (String, Instant)>,
    invalidations: Vec<Vec<String>>,
}

/// In-memory cache with TTL expiry and an invalidation log.
#[derive(Clone, Default)]
pub struct MemoryStockCache {
    inner: Arc<Mutex<CacheInner>>,
    fail: Arc<AtomicBool>,
}

impl MemoryStockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every cache call fails as unavailable.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every invalidation call, each with the exact keys it carried.
    pub fn invalidations(&self) -> Vec<Vec<String>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .invalidations
            .clone()
    }

    /// True when a live (unexpired) entry exists for this key.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .get(key)
            .is_some_and(|(_, expires)| Instant::now() < *expires)
    }

    /// Seeds a raw body, bypassing the port. Used to plant unreadable
    /// entries.
    pub fn put_raw(&self, key: &str, body: &str, ttl: Duration) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .insert(key.to_string(), (body.to_string(), Instant::now() + ttl));
    }
}

#[async_trait]
impl StockCache for MemoryStockCache {
    async fn invalidate(&self, keys: &[String]) -> DownstreamResult {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DownstreamError::unavailable("invalidate", "cache offline"));
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            inner.entries.remove(key);
        }
        inner.invalidations.push(keys.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>, DownstreamError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DownstreamError::unavailable("read", "cache offline"));
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let expired = inner
            .entries
            .get(key)
            .is_some_and(|(_, expires)| now >= *expires);
        if expired {
            inner.entries.remove(key);
            return Ok(None);
        }
        Ok(inner.entries.get(key).map(|(body, _)| body.clone()))
    }

    async fn write(&self, key: &str, body: &str, ttl: Duration) -> DownstreamResult {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DownstreamError::unavailable("write", "cache offline"));
        }
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .insert(key.to_string(), (body.to_string(), Instant::now() + ttl));
        Ok(())
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Notifier that records queued notifications.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    notes: Arc<Mutex<Vec<Notification>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every notify fails as unavailable.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every queued notification, in order.
    pub fn notes(&self) -> Vec<Notification> {
        self.notes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, note: &Notification) -> DownstreamResult {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DownstreamError::unavailable("notify", "queue offline"));
        }
        self.notes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(note.clone());
        Ok(())
    }
}

// =============================================================================
// Reconciliation Feed
// =============================================================================

/// Feed over the in-memory stores, applying the matching rule: a purchase
/// movement is matched by a purchase row with its order reference or by a
/// reversal movement carrying that reference.
#[derive(Clone)]
pub struct MemoryReconciliationFeed {
    stocks: MemoryStockStore,
    purchases: MemoryPurchaseStore,
}

impl MemoryReconciliationFeed {
    pub fn new(stocks: MemoryStockStore, purchases: MemoryPurchaseStore) -> Self {
        MemoryReconciliationFeed { stocks, purchases }
    }
}

#[async_trait]
impl ReconciliationFeed for MemoryReconciliationFeed {
    async fn unmatched_purchase_movements(
        &self,
        grace: chrono::Duration,
    ) -> Result<Vec<StockMovement>, SettlementError> {
        let cutoff = Utc::now() - grace;
        let movements = self.stocks.movements();
        let reversal_refs: HashSet<String> = movements
            .iter()
            .filter(|m| m.reason == MovementReason::Reversal)
            .filter_map(|m| m.reference.clone())
            .collect();

        let mut orphans = Vec::new();
        for movement in movements
            .iter()
            .filter(|m| m.reason == MovementReason::Purchase && m.occurred_at <= cutoff)
        {
            let matched = match &movement.reference {
                Some(reference) => {
                    reversal_refs.contains(reference) || self.purchases.has_order(reference)
                }
                None => false,
            };
            if !matched {
                orphans.push(movement.clone());
            }
        }
        Ok(orphans)
    }
}

// =============================================================================
// World
// =============================================================================

/// All fakes together, preassembled the way production wiring assembles the
/// real adapters.
#[derive(Clone, Default)]
pub struct MemoryWorld {
    pub stocks: MemoryStockStore,
    pub purchases: MemoryPurchaseStore,
    pub payouts: MemoryPayoutStore,
    pub directory: MemoryAdminDirectory,
    pub events: RecordingEventSink,
    pub cache: MemoryStockCache,
    pub notifier: MemoryNotifier,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundles the fakes behind the port traits.
    pub fn ports(&self) -> Ports {
        Ports {
            ledger: Arc::new(self.stocks.clone()),
            catalog: Arc::new(self.stocks.clone()),
            recorder: Arc::new(self.purchases.clone()),
            payouts: Arc::new(self.payouts.clone()),
            directory: Arc::new(self.directory.clone()),
            events: Arc::new(self.events.clone()),
            cache: Arc::new(self.cache.clone()),
            notifier: Arc::new(self.notifier.clone()),
        }
    }

    /// Reconciliation feed over the same stores the ports use.
    pub fn feed(&self) -> Arc<dyn ReconciliationFeed> {
        Arc::new(MemoryReconciliationFeed::new(
            self.stocks.clone(),
            self.purchases.clone(),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
