//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │   StockItem     │   │ PurchaseRecord   │   │     Payout      │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │   │  id (UUID)       │   │  id (UUID)      │      │
//! │  │  store_id       │   │  order_reference │   │  admin_id       │      │
//! │  │  admin_id       │   │  quantity        │   │  gross_cents    │      │
//! │  │  quantity       │   │  total_cents     │   │  amount_cents   │      │
//! │  │  price_cents    │   │  payment_status  │   │  rate_bps       │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐                            │
//! │  │ StockMovement   │   │  PaymentStatus   │                            │
//! │  │  ─────────────  │   │  ──────────────  │                            │
//! │  │  delta          │   │  Completed       │                            │
//! │  │  quantity_after │   │  Pending         │                            │
//! │  │  reason         │   │  Failed          │                            │
//! │  └─────────────────┘   └──────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key where one exists: (order_reference for purchases)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::{evaluate_stock_level, AlertDecision};
use crate::money::Money;

// =============================================================================
// Stock Item
// =============================================================================

/// A stock item listed in a store.
///
/// Quantities are authoritative in the database; this struct is a snapshot.
/// All mutations go through the floor-checked ledger operations, never
/// through read-modify-write on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this item is listed in. Item IDs never leak across stores.
    pub store_id: String,

    /// Admin who owns the listing. Snapshotted onto purchases for payouts.
    pub admin_id: String,

    /// Display name shown to customers.
    pub name: String,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Evaluates this item's current quantity against the alert threshold.
    #[inline]
    pub fn alert_decision(&self) -> AlertDecision {
        evaluate_stock_level(self.quantity)
    }
}

/// Input for creating a stock item. The ID, owner, and timestamps are
/// assigned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStockItem {
    pub store_id: String,
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Partial update for a stock item's descriptive fields.
///
/// Quantity is deliberately absent: quantity only moves through the
/// floor-checked ledger (purchases and rebalances), never through a blind
/// overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPatch {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
}

impl StockPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price_cents.is_none()
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Why a stock quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Units left the shelf because a purchase settled.
    Purchase,
    /// An admin topped the item up.
    Rebalance,
    /// A compensating increment after a purchase lost the duplicate race.
    Reversal,
}

impl MovementReason {
    /// Stable label stored in the movements table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementReason::Purchase => "purchase",
            MovementReason::Rebalance => "rebalance",
            MovementReason::Reversal => "reversal",
        }
    }

    /// Parses a stored label back into a reason.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(MovementReason::Purchase),
            "rebalance" => Some(MovementReason::Rebalance),
            "reversal" => Some(MovementReason::Reversal),
            _ => None,
        }
    }
}

/// One quantity change in the audit trail.
///
/// Every ledger mutation writes exactly one movement in the same transaction
/// as the quantity change, so the trail can be replayed against the purchase
/// ledger during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub stock_id: String,
    pub store_id: String,
    /// Signed change: negative for purchases, positive for top-ups.
    pub delta: i64,
    /// Quantity immediately after this movement applied.
    pub quantity_after: i64,
    pub reason: MovementReason,
    /// Order reference for purchase/reversal movements.
    pub reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Provider-reported status of the payment behind a purchase.
///
/// Settlement does not gate on this: a pending payment still settles, and
/// the provider's later webhook flips the status. What never changes is the
/// quantity math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

impl PaymentStatus {
    /// Stable label stored in the purchases table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Parses a stored label back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(PaymentStatus::Completed),
            "pending" => Some(PaymentStatus::Pending),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Completed
    }
}

// =============================================================================
// Purchase Record
// =============================================================================

/// An immutable, settled purchase.
///
/// Uses the snapshot pattern: `admin_id` and `unit_price_cents` are frozen at
/// settlement time, so payout windows survive later stock edits or deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub customer_id: Option<String>,
    pub stock_id: String,
    pub store_id: String,
    /// Owning admin at time of settlement (frozen).
    pub admin_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of settlement (frozen).
    pub unit_price_cents: i64,
    /// Total paid in cents (unit price × quantity, or amount paid verbatim).
    pub total_cents: i64,
    /// Caller-supplied idempotency key. Unique across all purchases.
    pub order_reference: String,
    pub payment_status: PaymentStatus,
    pub purchased_at: DateTime<Utc>,
    /// Whether the confirmation email was handed to the notification queue.
    pub confirmation_sent: bool,
}

impl PurchaseRecord {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Payout
// =============================================================================

/// A payout written for an admin over a window of purchases.
///
/// `paid_at` doubles as the lower bound of the NEXT payout window, which is
/// why payout writes are serialized per admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub admin_id: String,
    /// Sum of purchase totals in the window, in cents.
    pub gross_cents: i64,
    /// Amount actually paid out after commission, in cents.
    pub amount_cents: i64,
    /// Commission rate applied, in basis points.
    pub rate_bps: u32,
    /// The super admin who triggered the payout.
    pub paid_by: String,
    pub paid_at: DateTime<Utc>,
}

impl Payout {
    /// Returns the paid amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Earnings preview for an admin's pending window. Read-only; writes nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsStatement {
    pub admin_id: String,
    /// Lower bound of the window (the last payout time), if any.
    pub window_start: Option<DateTime<Utc>>,
    pub purchase_count: i64,
    pub gross_cents: i64,
    pub rate_bps: u32,
    pub commission_cents: i64,
    pub net_cents: i64,
}

// =============================================================================
// Admin Contact
// =============================================================================

/// Minimal admin projection used to stamp event payloads and route
/// notifications. The full admin profile lives in the auth domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminContact {
    pub id: String,
    pub email: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
