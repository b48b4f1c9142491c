//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate is the **heart** of the Stockroom settlement platform. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockroom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    settlement-api (HTTP)                        │   │
//! │  │    purchase ──► rebalance ──► payout ──► stock CRUD            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              stockroom-settlement (orchestration)               │   │
//! │  │    PurchaseSettlement, PayoutCalculator, CatalogService        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ commission │  │   alert   │  │   │
//! │  │   │ StockItem │  │   Money   │  │   tiers    │  │ threshold │  │   │
//! │  │   │ Purchase  │  │ cent math │  │  bps math  │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        stockroom-db (PostgreSQL) / stockroom-adapters (Redis)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockItem, PurchaseRecord, Payout, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`commission`] - Subscription tier to commission rate mapping
//! - [`alert`] - Low-stock threshold and replenishment floor rules
//! - [`events`] - Event log topics and flat payload types
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//! use stockroom_core::commission::CommissionTier;
//!
//! // Gross earnings of $300.00, admin subscribed to plan 1 (15%)
//! let gross = Money::from_cents(30_000);
//! let rate = CommissionTier::from_plan_id(Some(1)).rate();
//!
//! // Payout keeps 85% of gross, rounded half-up on the final amount
//! assert_eq!(rate.net_of(gross).cents(), 25_500); // $255.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alert;
pub mod commission;
pub mod error;
pub mod events;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockroom_core::Money` instead of
// `use stockroom_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity below which a stock item is considered low and an alert fires.
///
/// ## Business Rule
/// The alert fires when quantity is STRICTLY below this value. A stock item
/// sitting at exactly 10 units is healthy; at 9 it alerts.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Minimum quantity a rebalance must bring a stock item up to.
///
/// ## Business Rule
/// A top-up that would leave the item at or below the alert threshold is
/// pointless, so rebalancing requires landing strictly above it.
pub const REBALANCE_FLOOR: i64 = LOW_STOCK_THRESHOLD + 1;

/// Maximum quantity accepted for a single purchase line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Configurable per-tenant in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;
