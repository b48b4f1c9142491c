//! End-to-end settlement flows over the in-memory adapters.
//!
//! Covers the purchase pipeline (happy path, idempotency, compensation,
//! oversell protection, best-effort isolation), rebalancing, payouts, and
//! the reconciliation sweep.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use stockroom_core::error::CoreError;
use stockroom_core::events::{TOPIC_STOCK_ALERTS, TOPIC_STOCK_EVENTS};
use stockroom_core::types::{
    AdminContact, MovementReason, NewStockItem, PaymentStatus, PurchaseRecord, StockItem,
    StockPatch,
};
use stockroom_settlement::contracts::{PurchaseRecorder, StockLedger, WindowEarnings};
use stockroom_settlement::memory::{MemoryPurchaseStore, MemoryWorld};
use stockroom_settlement::{
    CatalogService, PayoutCalculator, PurchaseRequest, PurchaseSettlement, Reconciler,
    SettlementError,
};

const STORE: &str = "store-1";
const STOCK: &str = "stk-1";
const ADMIN: &str = "adm-1";
const SUPER: &str = "super-1";

fn world_with_stock(quantity: i64) -> MemoryWorld {
    let world = MemoryWorld::new();
    world.directory.upsert(AdminContact {
        id: ADMIN.to_string(),
        email: "owner@example.com".to_string(),
    });
    let now = Utc::now();
    world.stocks.seed(StockItem {
        id: STOCK.to_string(),
        store_id: STORE.to_string(),
        admin_id: ADMIN.to_string(),
        name: "Espresso Beans 1kg".to_string(),
        quantity,
        price_cents: 5000,
        created_at: now,
        updated_at: now,
    });
    world
}

fn request(order: &str, quantity: i64) -> PurchaseRequest {
    PurchaseRequest {
        quantity,
        order_reference: order.to_string(),
        customer_id: Some("cust-1".to_string()),
        amount_paid_cents: None,
        payment_status: None,
    }
}

fn purchase_row(order: &str, total_cents: i64, purchased_at: DateTime<Utc>) -> PurchaseRecord {
    PurchaseRecord {
        id: Uuid::new_v4().to_string(),
        customer_id: None,
        stock_id: STOCK.to_string(),
        store_id: STORE.to_string(),
        admin_id: ADMIN.to_string(),
        quantity: 1,
        unit_price_cents: total_cents,
        total_cents,
        order_reference: order.to_string(),
        payment_status: PaymentStatus::Completed,
        purchased_at,
        confirmation_sent: false,
    }
}

// =============================================================================
// Purchase Pipeline
// =============================================================================

#[tokio::test]
async fn purchase_settles_and_fires_alert() {
    let world = world_with_stock(12);
    let settlement = PurchaseSettlement::new(world.ports());

    let receipt = settlement
        .settle(STORE, STOCK, request("ord-100", 3))
        .await
        .unwrap();

    assert_eq!(receipt.new_quantity, Some(9));
    assert_eq!(receipt.unit_price_cents, 5000);
    assert_eq!(receipt.total_cents, 15_000);
    assert!(receipt.alert_fired);
    assert!(!receipt.already_settled);
    assert!(receipt.confirmation_queued);
    let purchase = receipt.purchase.unwrap();
    assert!(purchase.confirmation_sent);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(9));

    // One purchased event with the flat payload contract
    let events = world.events.on_topic(TOPIC_STOCK_EVENTS);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "stock-purchased");
    assert_eq!(events[0]["id"], STOCK);
    assert_eq!(events[0]["name"], "Espresso Beans 1kg");
    assert_eq!(events[0]["quantity"], 9);
    assert_eq!(events[0]["store_id"], STORE);
    assert_eq!(events[0]["admin_email"], "owner@example.com");
    assert!(events[0]["timestamp"].is_string());

    // 9 < 10, so one alert
    let alerts = world.events.on_topic(TOPIC_STOCK_ALERTS);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["type"], "LOW_STOCK");
    assert_eq!(alerts[0]["quantity"], 9);

    // Exactly the two listing keys, exactly once
    let invalidations = world.cache.invalidations();
    assert_eq!(invalidations.len(), 1);
    assert_eq!(invalidations[0], vec!["stocks", "stocks:store-1"]);

    // Low-stock note to the admin, confirmation to the customer
    let notes = world.notifier.notes();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].recipient, "owner@example.com");
    assert_eq!(notes[1].recipient, "cust-1");
}

#[tokio::test]
async fn purchase_above_threshold_fires_no_alert() {
    let world = world_with_stock(50);
    let settlement = PurchaseSettlement::new(world.ports());

    let receipt = settlement
        .settle(STORE, STOCK, request("ord-101", 3))
        .await
        .unwrap();

    assert_eq!(receipt.new_quantity, Some(47));
    assert!(!receipt.alert_fired);
    assert!(world.events.on_topic(TOPIC_STOCK_ALERTS).is_empty());
    assert_eq!(world.notifier.notes().len(), 1);
}

#[tokio::test]
async fn replay_returns_original_receipt_without_moving_stock() {
    let world = world_with_stock(12);
    let settlement = PurchaseSettlement::new(world.ports());

    let first = settlement
        .settle(STORE, STOCK, request("ord-102", 3))
        .await
        .unwrap();
    assert_eq!(first.new_quantity, Some(9));

    // Same order again, even with a different quantity
    let replay = settlement
        .settle(STORE, STOCK, request("ord-102", 5))
        .await
        .unwrap();

    assert!(replay.already_settled);
    assert_eq!(replay.new_quantity, None);
    assert_eq!(replay.quantity, 3);
    assert_eq!(replay.total_cents, 15_000);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(9));
    assert_eq!(world.purchases.records().len(), 1);
    // Replay publishes nothing
    assert_eq!(world.events.on_topic(TOPIC_STOCK_EVENTS).len(), 1);
}

#[tokio::test]
async fn insufficient_stock_rejects_without_side_effects() {
    let world = world_with_stock(2);
    let settlement = PurchaseSettlement::new(world.ports());

    let err = settlement
        .settle(STORE, STOCK, request("ord-103", 5))
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(CoreError::InsufficientStock {
            available: 2,
            requested: 5,
            ..
        })
    ));
    assert_eq!(world.stocks.quantity_of(STOCK), Some(2));
    assert!(world.stocks.movements().is_empty());
    assert!(world.purchases.records().is_empty());
    assert!(world.events.published().is_empty());
    assert!(world.cache.invalidations().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn oversell_never_goes_negative_under_concurrency() {
    let world = world_with_stock(10);
    let settlement = Arc::new(PurchaseSettlement::new(world.ports()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let settlement = Arc::clone(&settlement);
        handles.push(tokio::spawn(async move {
            settlement
                .settle(STORE, STOCK, request(&format!("ord-c{i}"), 3))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // 10 on hand, 3 per order: exactly three orders fit
    assert_eq!(successes, 3);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(1));
    assert_eq!(world.purchases.records().len(), 3);
    assert_eq!(world.stocks.movements().len(), 3);
}

// =============================================================================
// Duplicate Race Compensation
// =============================================================================

/// Recorder whose first lookup misses, simulating a winner whose insert is
/// not yet visible at pre-check time.
struct RacingRecorder {
    inner: MemoryPurchaseStore,
    lookups: AtomicUsize,
}

#[async_trait]
impl PurchaseRecorder for RacingRecorder {
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), SettlementError> {
        self.inner.record(purchase).await
    }

    async fn find_by_order(
        &self,
        order_reference: &str,
    ) -> Result<Option<PurchaseRecord>, SettlementError> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        self.inner.find_by_order(order_reference).await
    }

    async fn mark_confirmation_sent(&self, purchase_id: &str) -> Result<(), SettlementError> {
        self.inner.mark_confirmation_sent(purchase_id).await
    }

    async fn window_earnings(
        &self,
        admin_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> Result<WindowEarnings, SettlementError> {
        self.inner.window_earnings(admin_id, after).await
    }
}

#[tokio::test]
async fn duplicate_race_compensates_with_reversal() {
    let world = world_with_stock(12);
    // The winner settled ord-dup already; this instance's pre-check misses it.
    world
        .purchases
        .seed(purchase_row("ord-dup", 10_000, Utc::now()));

    let mut ports = world.ports();
    ports.recorder = Arc::new(RacingRecorder {
        inner: world.purchases.clone(),
        lookups: AtomicUsize::new(0),
    });
    let settlement = PurchaseSettlement::new(ports);

    let receipt = settlement
        .settle(STORE, STOCK, request("ord-dup", 2))
        .await
        .unwrap();

    // The loser reversed its decrement and replayed the winner's receipt
    assert!(receipt.already_settled);
    assert_eq!(receipt.total_cents, 10_000);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(12));
    assert_eq!(world.purchases.records().len(), 1);

    let movements = world.stocks.movements();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0].delta, -2);
    assert_eq!(movements[0].reason, MovementReason::Purchase);
    assert_eq!(movements[1].delta, 2);
    assert_eq!(movements[1].reason, MovementReason::Reversal);
    assert_eq!(movements[1].reference.as_deref(), Some("ord-dup"));
}

// =============================================================================
// Degraded Dependencies
// =============================================================================

#[tokio::test]
async fn recorder_failure_settles_recordless() {
    let world = world_with_stock(12);
    world.purchases.set_fail_writes(true);
    let settlement = PurchaseSettlement::new(world.ports());

    let receipt = settlement
        .settle(STORE, STOCK, request("ord-104", 3))
        .await
        .unwrap();

    // Quantity and events still settled; the record is the casualty
    assert_eq!(receipt.new_quantity, Some(9));
    assert!(receipt.purchase.is_none());
    assert!(!receipt.confirmation_queued);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(9));
    assert!(world.purchases.records().is_empty());
    assert_eq!(world.events.on_topic(TOPIC_STOCK_EVENTS).len(), 1);
    assert_eq!(world.cache.invalidations().len(), 1);
}

#[tokio::test]
async fn downstream_outage_never_fails_settlement() {
    let world = world_with_stock(12);
    world.events.set_fail(true);
    world.cache.set_fail(true);
    world.notifier.set_fail(true);
    let settlement = PurchaseSettlement::new(world.ports());

    let receipt = settlement
        .settle(STORE, STOCK, request("ord-105", 3))
        .await
        .unwrap();

    assert_eq!(receipt.new_quantity, Some(9));
    assert!(!receipt.confirmation_queued);
    let purchase = receipt.purchase.unwrap();
    assert!(!purchase.confirmation_sent);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(9));
    assert_eq!(world.purchases.records().len(), 1);
}

#[tokio::test]
async fn directory_outage_degrades_admin_email() {
    let world = world_with_stock(12);
    world.directory.set_fail(true);
    let settlement = PurchaseSettlement::new(world.ports());

    settlement
        .settle(STORE, STOCK, request("ord-106", 3))
        .await
        .unwrap();

    // Payload stays structurally complete, stamped with the admin ID
    let alerts = world.events.on_topic(TOPIC_STOCK_ALERTS);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["admin_email"], ADMIN);
}

// =============================================================================
// Rebalancing
// =============================================================================

#[tokio::test]
async fn rebalance_tops_up_past_the_floor() {
    let world = world_with_stock(4);
    let catalog = CatalogService::new(world.ports());

    let outcome = catalog.rebalance(STORE, STOCK, ADMIN, 7).await.unwrap();

    assert_eq!(outcome.new_quantity, 11);
    assert!(!outcome.alert_fired);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(11));

    let movements = world.stocks.movements();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].delta, 7);
    assert_eq!(movements[0].reason, MovementReason::Rebalance);
    assert_eq!(movements[0].reference.as_deref(), Some(ADMIN));

    let events = world.events.on_topic(TOPIC_STOCK_EVENTS);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "stock-updated");
    assert_eq!(events[0]["quantity"], 11);
    assert_eq!(world.cache.invalidations().len(), 1);
}

#[tokio::test]
async fn rebalance_rejects_top_up_below_floor() {
    let world = world_with_stock(4);
    let catalog = CatalogService::new(world.ports());

    // 4 + 6 = 10 never clears the threshold
    let err = catalog.rebalance(STORE, STOCK, ADMIN, 6).await.unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(CoreError::InsufficientTopUp {
            required: 7,
            offered: 6,
            ..
        })
    ));
    assert_eq!(world.stocks.quantity_of(STOCK), Some(4));
    assert!(world.stocks.movements().is_empty());
    assert!(world.events.published().is_empty());
}

#[tokio::test]
async fn rebalance_requires_ownership() {
    let world = world_with_stock(4);
    let catalog = CatalogService::new(world.ports());

    let err = catalog
        .rebalance(STORE, STOCK, "adm-2", 20)
        .await
        .unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(CoreError::NotAuthorized { .. })
    ));
    assert_eq!(world.stocks.quantity_of(STOCK), Some(4));
}

#[tokio::test]
async fn rebalance_rejects_non_positive_amount() {
    let world = world_with_stock(4);
    let catalog = CatalogService::new(world.ports());

    assert!(catalog.rebalance(STORE, STOCK, ADMIN, 0).await.is_err());
    assert!(catalog.rebalance(STORE, STOCK, ADMIN, -3).await.is_err());
}

// =============================================================================
// Catalog and Listing Cache
// =============================================================================

#[tokio::test]
async fn listing_cache_fills_and_invalidates() {
    let world = world_with_stock(12);
    let catalog = CatalogService::new(world.ports());

    let listed = catalog.list_stocks(STORE).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(world.cache.contains("stocks:store-1"));

    // A mutation drops the cached listing
    catalog
        .update_stock(
            STORE,
            STOCK,
            ADMIN,
            StockPatch {
                name: Some("Espresso Beans 500g".to_string()),
                price_cents: None,
            },
        )
        .await
        .unwrap();
    assert!(!world.cache.contains("stocks:store-1"));

    // Next read repopulates with the new name
    let relisted = catalog.list_stocks(STORE).await.unwrap();
    assert_eq!(relisted[0].name, "Espresso Beans 500g");
    assert!(world.cache.contains("stocks:store-1"));
}

#[tokio::test]
async fn unreadable_cache_entry_falls_back_to_catalog() {
    let world = world_with_stock(12);
    world
        .cache
        .put_raw("stocks:store-1", "not-json", Duration::from_secs(60));
    let catalog = CatalogService::new(world.ports());

    let listed = catalog.list_stocks(STORE).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, STOCK);
}

#[tokio::test]
async fn empty_patch_changes_nothing() {
    let world = world_with_stock(12);
    let catalog = CatalogService::new(world.ports());

    let unchanged = catalog
        .update_stock(STORE, STOCK, ADMIN, StockPatch::default())
        .await
        .unwrap();

    assert_eq!(unchanged.name, "Espresso Beans 1kg");
    assert!(world.events.published().is_empty());
    assert!(world.cache.invalidations().is_empty());
}

#[tokio::test]
async fn create_stock_emits_added_event() {
    let world = world_with_stock(12);
    let catalog = CatalogService::new(world.ports());

    let item = catalog
        .create_stock(
            ADMIN,
            NewStockItem {
                store_id: STORE.to_string(),
                name: "Filter Papers".to_string(),
                quantity: 40,
                price_cents: 700,
            },
        )
        .await
        .unwrap();

    assert_eq!(item.admin_id, ADMIN);
    let events = world.events.on_topic(TOPIC_STOCK_EVENTS);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "stock-added");
    assert_eq!(events[0]["quantity"], 40);

    let err = catalog
        .create_stock(
            ADMIN,
            NewStockItem {
                store_id: STORE.to_string(),
                name: "  ".to_string(),
                quantity: 1,
                price_cents: 100,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn delete_stock_keeps_settled_purchases() {
    let world = world_with_stock(12);
    let settlement = PurchaseSettlement::new(world.ports());
    let catalog = CatalogService::new(world.ports());

    settlement
        .settle(STORE, STOCK, request("ord-107", 3))
        .await
        .unwrap();

    let removed = catalog.delete_stock(STORE, STOCK, ADMIN).await.unwrap();
    assert_eq!(removed.quantity, 9);

    let events = world.events.on_topic(TOPIC_STOCK_EVENTS);
    assert_eq!(events.last().unwrap()["event"], "stock-removed");

    assert!(catalog.get_stock(STORE, STOCK).await.is_err());

    // The admin snapshot on the purchase keeps earning
    let window = world
        .purchases
        .window_earnings(ADMIN, None)
        .await
        .unwrap();
    assert_eq!(window.gross_cents, 15_000);
}

// =============================================================================
// Payouts
// =============================================================================

fn calculator(world: &MemoryWorld) -> PayoutCalculator {
    PayoutCalculator::new(
        Arc::new(world.purchases.clone()),
        Arc::new(world.payouts.clone()),
    )
}

#[tokio::test]
async fn payout_takes_commission_and_advances_window() {
    let world = world_with_stock(12);
    let now = Utc::now();
    world
        .purchases
        .seed(purchase_row("ord-p1", 10_000, now - chrono::Duration::minutes(10)));
    world
        .purchases
        .seed(purchase_row("ord-p2", 20_000, now - chrono::Duration::minutes(5)));
    let payouts = calculator(&world);

    // $300.00 gross at the default 15% pays exactly $255.00
    let payout = payouts.run_payout(ADMIN, SUPER).await.unwrap();
    assert_eq!(payout.gross_cents, 30_000);
    assert_eq!(payout.rate_bps, 1500);
    assert_eq!(payout.amount_cents, 25_500);
    assert_eq!(payout.paid_by, SUPER);

    // The window advanced: nothing left to pay
    let err = payouts.run_payout(ADMIN, SUPER).await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::NothingToPay { .. })
    ));

    // A purchase after paid_at opens a fresh window
    world.purchases.seed(purchase_row(
        "ord-p3",
        4_000,
        payout.paid_at + chrono::Duration::milliseconds(1),
    ));
    let second = payouts.run_payout(ADMIN, SUPER).await.unwrap();
    assert_eq!(second.gross_cents, 4_000);
    assert_eq!(second.amount_cents, 3_400);

    let history = payouts.history(ADMIN).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
}

#[tokio::test]
async fn payout_rate_follows_active_plan() {
    // Plan 2: 10%
    let world = world_with_stock(12);
    world.purchases.seed(purchase_row("ord-p1", 30_000, Utc::now()));
    world.payouts.set_plan(ADMIN, 2);
    let payout = calculator(&world).run_payout(ADMIN, SUPER).await.unwrap();
    assert_eq!(payout.rate_bps, 1000);
    assert_eq!(payout.amount_cents, 27_000);

    // Plan 3: 5%
    let world = world_with_stock(12);
    world.purchases.seed(purchase_row("ord-p1", 10_000, Utc::now()));
    world.payouts.set_plan(ADMIN, 3);
    let payout = calculator(&world).run_payout(ADMIN, SUPER).await.unwrap();
    assert_eq!(payout.rate_bps, 500);
    assert_eq!(payout.amount_cents, 9_500);

    // Unknown plan falls back to the default 15%
    let world = world_with_stock(12);
    world.purchases.seed(purchase_row("ord-p1", 10_000, Utc::now()));
    world.payouts.set_plan(ADMIN, 42);
    let payout = calculator(&world).run_payout(ADMIN, SUPER).await.unwrap();
    assert_eq!(payout.rate_bps, 1500);
    assert_eq!(payout.amount_cents, 8_500);
}

#[tokio::test]
async fn payout_refuses_empty_window() {
    let world = world_with_stock(12);
    let err = calculator(&world).run_payout(ADMIN, SUPER).await.unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::NothingToPay { .. })
    ));
    assert!(calculator(&world).history(ADMIN).await.unwrap().is_empty());
}

#[tokio::test]
async fn earnings_preview_writes_nothing() {
    let world = world_with_stock(12);
    world.purchases.seed(purchase_row("ord-p1", 30_000, Utc::now()));
    let payouts = calculator(&world);

    let statement = payouts.earnings(ADMIN).await.unwrap();
    assert_eq!(statement.gross_cents, 30_000);
    assert_eq!(statement.rate_bps, 1500);
    assert_eq!(statement.commission_cents, 4_500);
    assert_eq!(statement.net_cents, 25_500);
    assert_eq!(statement.window_start, None);

    assert!(payouts.history(ADMIN).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_payouts_write_one_row() {
    let world = world_with_stock(12);
    world.purchases.seed(purchase_row("ord-p1", 30_000, Utc::now()));
    let payouts = Arc::new(calculator(&world));

    let a = tokio::spawn({
        let payouts = Arc::clone(&payouts);
        async move { payouts.run_payout(ADMIN, SUPER).await }
    });
    let b = tokio::spawn({
        let payouts = Arc::clone(&payouts);
        async move { payouts.run_payout(ADMIN, SUPER).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();

    // One writer wins the window; the other finds it empty
    assert_eq!(successes, 1);
    assert_eq!(payouts.history(ADMIN).await.unwrap().len(), 1);
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn sweep_flags_only_recordless_movements() {
    let world = world_with_stock(20);
    let settlement = PurchaseSettlement::new(world.ports());
    let reconciler = Reconciler::with_grace(world.feed(), chrono::Duration::zero());

    // A recorded purchase is matched by its purchase row
    settlement
        .settle(STORE, STOCK, request("ord-ok", 2))
        .await
        .unwrap();
    assert!(reconciler.sweep().await.unwrap().is_clean());

    // A compensated pair is matched by its reversal
    world
        .stocks
        .decrement(STORE, STOCK, 1, "ord-rev")
        .await
        .unwrap();
    world
        .stocks
        .increment(STORE, STOCK, 1, MovementReason::Reversal, Some("ord-rev"))
        .await
        .unwrap();
    assert!(reconciler.sweep().await.unwrap().is_clean());

    // A recordless settlement leaves an orphan
    world.purchases.set_fail_writes(true);
    settlement
        .settle(STORE, STOCK, request("ord-lost", 2))
        .await
        .unwrap();
    world.purchases.set_fail_writes(false);

    let report = reconciler.sweep().await.unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.orphaned.len(), 1);
    assert_eq!(report.orphaned[0].reference.as_deref(), Some("ord-lost"));
    assert_eq!(report.orphaned[0].delta, -2);
}
