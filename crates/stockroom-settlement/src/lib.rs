//! # stockroom-settlement: Settlement Flows and Port Contracts
//!
//! Orchestration layer for the Stockroom settlement core. Everything with a
//! side effect is reached through a port trait, so the flows in this crate
//! are testable against the in-memory implementations in [`memory`] and run
//! in production against PostgreSQL and Redis adapters.
//!
//! ## The Settlement Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Purchase Settlement                                │
//! │                                                                         │
//! │  0. Idempotency pre-check ── order already settled? return receipt     │
//! │  1. Validate + resolve unit price                                      │
//! │  2. Atomic floor-checked decrement          ◄── FATAL on failure       │
//! │  3. Record immutable purchase               ◄── duplicate? compensate  │
//! │  4. Low-stock alert (< 10)                  ◄── best-effort            │
//! │  5. stock-purchased event                   ◄── best-effort            │
//! │  6. Invalidate listing cache keys           ◄── best-effort            │
//! │  7. Queue confirmation + mark sent          ◄── best-effort            │
//! │                                                                         │
//! │  Money and quantity math is settled by step 3. Steps 4-7 never undo    │
//! │  it and never fail the call.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`contracts`] - Port traits the flows are wired through
//! - [`settle`] - The purchase settlement orchestrator
//! - [`payout`] - Windowed commission payouts
//! - [`catalog`] - Stock CRUD, listings cache, rebalancing
//! - [`reconcile`] - Movement/purchase reconciliation sweep
//! - [`memory`] - In-memory port implementations for tests and demos
//! - [`error`] - Settlement error taxonomy

pub mod catalog;
pub mod contracts;
pub mod error;
pub mod memory;
pub mod payout;
pub mod reconcile;
pub mod settle;

pub use catalog::{CatalogService, RebalanceOutcome};
pub use contracts::{
    cache_keys, AdminDirectory, DownstreamError, EventSink, Notification, NotificationKind,
    Notifier, Ports, PurchaseRecorder, PayoutStore, ReconciliationFeed, StockCache, StockCatalog,
    StockLedger, WindowEarnings,
};
pub use error::{SettlementError, SettlementResult};
pub use payout::PayoutCalculator;
pub use reconcile::{ReconcilerHandle, ReconcilerTask, ReconciliationReport, Reconciler};
pub use settle::{PurchaseRequest, PurchaseSettlement, SettlementReceipt};
