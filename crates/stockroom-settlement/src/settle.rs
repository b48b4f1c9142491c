//! # Purchase Settlement
//!
//! The end-to-end purchase pipeline: money and quantity first, everything
//! else best-effort.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Step                         │ On failure                              │
//! │  ─────────────────────────────┼───────────────────────────────────────  │
//! │  0 idempotency pre-check      │ propagate (storage)                     │
//! │  1 validate + price           │ reject, nothing happened yet            │
//! │  2 ledger decrement           │ reject, nothing happened yet            │
//! │  3 purchase record            │ duplicate → reverse decrement, replay   │
//! │                               │ other     → warn, settle recordless     │
//! │  4 low-stock alert            │ warn and continue                       │
//! │  5 stock-purchased event      │ warn and continue                       │
//! │  6 cache invalidation         │ warn and continue                       │
//! │  7 confirmation queue + mark  │ warn and continue                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The one compensating action in the system lives in step 3: losing the
//! duplicate-order race after a successful decrement puts the units back
//! with a `reversal` movement, then replays the surviving record.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockroom_core::alert::evaluate_stock_level;
use stockroom_core::error::CoreError;
use stockroom_core::events::{StockAlert, StockEvent, StockEventKind};
use stockroom_core::money::Money;
use stockroom_core::types::{MovementReason, PaymentStatus, PurchaseRecord, StockItem};
use stockroom_core::validation::{
    validate_amount_paid, validate_identifier, validate_order_reference, validate_quantity,
};

use crate::contracts::{Notification, NotificationKind, Ports};
use crate::error::{SettlementError, SettlementResult};

// =============================================================================
// Request / Receipt
// =============================================================================

/// Body of a settlement call. Store and stock IDs arrive out of band (path
/// segments on the HTTP surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub quantity: i64,
    /// Caller-supplied idempotency key, unique per order.
    pub order_reference: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// When present, authoritative for pricing: the unit price becomes
    /// `amount_paid_cents / quantity` and the total is taken verbatim.
    #[serde(default)]
    pub amount_paid_cents: Option<i64>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

/// What a settlement call returns, for both fresh and replayed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub order_reference: String,
    pub store_id: String,
    pub stock_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    /// Post-decrement quantity. `None` when this call moved nothing (replay
    /// of an already-settled order).
    pub new_quantity: Option<i64>,
    pub alert_fired: bool,
    pub already_settled: bool,
    pub confirmation_queued: bool,
    /// The persisted record. `None` only on a recordless settlement (record
    /// insert failed non-duplicately and the flow carried on).
    pub purchase: Option<PurchaseRecord>,
}

// =============================================================================
// Purchase Settlement
// =============================================================================

/// Orchestrates the settlement pipeline over the port bundle.
pub struct PurchaseSettlement {
    ports: Ports,
}

impl PurchaseSettlement {
    pub fn new(ports: Ports) -> Self {
        PurchaseSettlement { ports }
    }

    /// Settles one purchase. Safe to retry with the same order reference.
    pub async fn settle(
        &self,
        store_id: &str,
        stock_id: &str,
        request: PurchaseRequest,
    ) -> SettlementResult<SettlementReceipt> {
        debug!(
            store_id = %store_id,
            stock_id = %stock_id,
            order = %request.order_reference,
            quantity = request.quantity,
            "settle requested"
        );

        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        validate_identifier("stockId", stock_id).map_err(CoreError::from)?;
        validate_quantity(request.quantity).map_err(CoreError::from)?;
        validate_order_reference(&request.order_reference).map_err(CoreError::from)?;
        if let Some(customer_id) = &request.customer_id {
            validate_identifier("customerId", customer_id).map_err(CoreError::from)?;
        }

        // Step 0: a retried order returns its original receipt.
        if let Some(existing) = self
            .ports
            .recorder
            .find_by_order(&request.order_reference)
            .await?
        {
            debug!(order = %request.order_reference, "order already settled, replaying receipt");
            return Ok(Self::replayed_receipt(existing));
        }

        // Step 1: snapshot the stock and fix the pricing.
        let stock = self.ports.catalog.fetch(store_id, stock_id).await?;
        let (unit_price_cents, total_cents) = resolve_pricing(&request, &stock)?;

        // Step 2: the only point that can reject for stock. Floor-checked
        // and atomic inside the ledger.
        let new_quantity = self
            .ports
            .ledger
            .decrement(store_id, stock_id, request.quantity, &request.order_reference)
            .await?;

        // Step 3: immutable record keyed by the order reference.
        let now = Utc::now();
        let record = PurchaseRecord {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id.clone(),
            stock_id: stock.id.clone(),
            store_id: stock.store_id.clone(),
            admin_id: stock.admin_id.clone(),
            quantity: request.quantity,
            unit_price_cents,
            total_cents,
            order_reference: request.order_reference.clone(),
            payment_status: request.payment_status.unwrap_or_default(),
            purchased_at: now,
            confirmation_sent: false,
        };

        let mut recorded = match self.ports.recorder.record(&record).await {
            Ok(()) => Some(record),
            Err(SettlementError::Domain(CoreError::DuplicateOrder(_))) => {
                // Lost the insert race to a concurrent settle of the same
                // order. Put the units back, then replay the winner.
                warn!(
                    order = %request.order_reference,
                    "duplicate order detected after decrement, reversing"
                );
                self.ports
                    .ledger
                    .increment(
                        store_id,
                        stock_id,
                        request.quantity,
                        MovementReason::Reversal,
                        Some(&request.order_reference),
                    )
                    .await?;
                let existing = self
                    .ports
                    .recorder
                    .find_by_order(&request.order_reference)
                    .await?
                    .ok_or_else(|| {
                        SettlementError::storage("duplicate order vanished during compensation")
                    })?;
                return Ok(Self::replayed_receipt(existing));
            }
            Err(err) => {
                // Units are off the shelf and payment is captured; losing
                // the record must not unwind that. The reconciliation sweep
                // picks the orphaned movement up.
                warn!(
                    order = %request.order_reference,
                    error = %err,
                    "purchase record failed, continuing recordless"
                );
                None
            }
        };

        let admin_email = self.ports.admin_email(&stock.admin_id).await;

        // Step 4: alert on the post-decrement quantity.
        let decision = evaluate_stock_level(new_quantity);
        if decision.fired() {
            let alert = StockAlert::low_stock(&stock, new_quantity, &admin_email, now);
            self.ports.emit(alert.into()).await;
            self.ports
                .notify_logged(Notification {
                    kind: NotificationKind::LowStock,
                    recipient: admin_email.clone(),
                    subject: format!("Low stock: {}", stock.name),
                    body: format!(
                        "{} is down to {} units in store {}",
                        stock.name, new_quantity, stock.store_id
                    ),
                })
                .await;
        }

        // Step 5: the purchased event, always.
        let event = StockEvent::from_snapshot(
            StockEventKind::Purchased,
            &stock,
            new_quantity,
            &admin_email,
            now,
        );
        self.ports.emit(event.into()).await;

        // Step 6: exactly the two listing keys.
        self.ports.invalidate_listings(store_id).await;

        // Step 7: confirmation, only for recorded purchases with a customer.
        let mut confirmation_queued = false;
        if let (Some(rec), Some(customer_id)) = (recorded.as_mut(), request.customer_id.as_ref()) {
            let note = Notification {
                kind: NotificationKind::PurchaseConfirmation,
                recipient: customer_id.clone(),
                subject: format!("Order {} confirmed", rec.order_reference),
                body: format!(
                    "{} x{} for {}",
                    stock.name,
                    rec.quantity,
                    Money::from_cents(rec.total_cents)
                ),
            };
            match self.ports.notifier.notify(&note).await {
                Ok(()) => {
                    confirmation_queued = true;
                    rec.confirmation_sent = true;
                    if let Err(err) = self.ports.recorder.mark_confirmation_sent(&rec.id).await {
                        warn!(purchase_id = %rec.id, error = %err, "confirmation flag update failed");
                    }
                }
                Err(err) => {
                    warn!(order = %rec.order_reference, error = %err, "confirmation queueing failed");
                }
            }
        }

        info!(
            order = %request.order_reference,
            store_id = %store_id,
            stock_id = %stock_id,
            quantity = request.quantity,
            total = %Money::from_cents(total_cents),
            new_quantity,
            alert = decision.fired(),
            "purchase settled"
        );

        Ok(SettlementReceipt {
            order_reference: request.order_reference,
            store_id: store_id.to_string(),
            stock_id: stock_id.to_string(),
            quantity: request.quantity,
            unit_price_cents,
            total_cents,
            new_quantity: Some(new_quantity),
            alert_fired: decision.fired(),
            already_settled: false,
            confirmation_queued,
            purchase: recorded,
        })
    }

    /// Receipt for an order that was settled by an earlier call.
    fn replayed_receipt(existing: PurchaseRecord) -> SettlementReceipt {
        SettlementReceipt {
            order_reference: existing.order_reference.clone(),
            store_id: existing.store_id.clone(),
            stock_id: existing.stock_id.clone(),
            quantity: existing.quantity,
            unit_price_cents: existing.unit_price_cents,
            total_cents: existing.total_cents,
            new_quantity: None,
            alert_fired: false,
            already_settled: true,
            confirmation_queued: existing.confirmation_sent,
            purchase: Some(existing),
        }
    }

}

/// Fixes the unit price and total for a settlement.
///
/// A caller-supplied paid amount wins over the catalog price; the remainder
/// of a non-divisible amount stays in the total so money is never invented
/// or lost.
fn resolve_pricing(
    request: &PurchaseRequest,
    stock: &StockItem,
) -> Result<(i64, i64), SettlementError> {
    match request.amount_paid_cents {
        Some(paid) => {
            validate_amount_paid(paid, request.quantity).map_err(CoreError::from)?;
            Ok((paid / request.quantity, paid))
        }
        None => Ok((
            stock.price_cents,
            Money::from_cents(stock.price_cents)
                .multiply_quantity(request.quantity)
                .cents(),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock_at(price_cents: i64) -> StockItem {
        StockItem {
            id: "stk-1".to_string(),
            store_id: "store-1".to_string(),
            admin_id: "adm-1".to_string(),
            name: "Espresso Beans 1kg".to_string(),
            quantity: 12,
            price_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(quantity: i64, amount_paid_cents: Option<i64>) -> PurchaseRequest {
        PurchaseRequest {
            quantity,
            order_reference: "ord-1".to_string(),
            customer_id: None,
            amount_paid_cents,
            payment_status: None,
        }
    }

    #[test]
    fn test_pricing_from_catalog() {
        let (unit, total) = resolve_pricing(&request(3, None), &stock_at(5000)).unwrap();
        assert_eq!(unit, 5000);
        assert_eq!(total, 15_000);
    }

    #[test]
    fn test_pricing_from_amount_paid() {
        let (unit, total) = resolve_pricing(&request(3, Some(15_000)), &stock_at(9999)).unwrap();
        assert_eq!(unit, 5000);
        assert_eq!(total, 15_000);
    }

    #[test]
    fn test_pricing_keeps_remainder_in_total() {
        // 100 cents over 3 units: unit floors to 33, total stays 100.
        let (unit, total) = resolve_pricing(&request(3, Some(100)), &stock_at(5000)).unwrap();
        assert_eq!(unit, 33);
        assert_eq!(total, 100);
    }

    #[test]
    fn test_pricing_rejects_unpayable_amount() {
        assert!(resolve_pricing(&request(3, Some(2)), &stock_at(5000)).is_err());
        assert!(resolve_pricing(&request(3, Some(0)), &stock_at(5000)).is_err());
    }

    #[test]
    fn test_replayed_receipt_shape() {
        let record = PurchaseRecord {
            id: "pur-1".to_string(),
            customer_id: Some("cust-1".to_string()),
            stock_id: "stk-1".to_string(),
            store_id: "store-1".to_string(),
            admin_id: "adm-1".to_string(),
            quantity: 3,
            unit_price_cents: 5000,
            total_cents: 15_000,
            order_reference: "ord-1".to_string(),
            payment_status: PaymentStatus::Completed,
            purchased_at: Utc::now(),
            confirmation_sent: false,
        };
        let receipt = PurchaseSettlement::replayed_receipt(record);
        assert!(receipt.already_settled);
        assert_eq!(receipt.new_quantity, None);
        assert!(!receipt.alert_fired);
        assert_eq!(receipt.total_cents, 15_000);
    }
}
