//! # Repository Module
//!
//! PostgreSQL repository implementations for the settlement store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Each repository is a cheap handle around the shared pool that         │
//! │  implements one (or two) of the settlement port traits.                │
//! │                                                                         │
//! │  PurchaseSettlement                                                    │
//! │       │                                                                 │
//! │       │  ledger.decrement(store, stock, qty, order_ref)                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StockRepository                                                       │
//! │  ├── fetch(&self, store_id, stock_id)        ← StockCatalog            │
//! │  ├── decrement(&self, ...)                   ← StockLedger             │
//! │  └── increment(&self, ...)                   ← StockLedger             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                            │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Flows test against in-memory ports, not SQL                         │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`stock::StockRepository`] - Stock catalog and the movement ledger
//! - [`purchase::PurchaseRepository`] - Immutable purchase records
//! - [`payout::PayoutRepository`] - Payout history and commission plans
//! - [`admin::AdminRepository`] - Admin contact directory
//! - [`reconcile::PgReconciliationFeed`] - Orphaned-movement sweep queries

pub mod admin;
pub mod payout;
pub mod purchase;
pub mod reconcile;
pub mod stock;
