//! # stockroom-db: PostgreSQL Storage for Stockroom
//!
//! This crate implements the storage ports from `stockroom-settlement` over
//! PostgreSQL, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Data Flow                               │
//! │                                                                         │
//! │  Settlement flow (PurchaseSettlement::settle)                           │
//! │       │                                                                 │
//! │       │   via Arc<dyn StockLedger>, Arc<dyn PurchaseRecorder>, ...     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     stockroom-db (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌───────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │   │Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │   │(embedded) │  │   │
//! │  │   │               │    │ StockRepository    │   │           │  │   │
//! │  │   │ PgPool        │◄───│ PurchaseRepository │   │0001_*.sql │  │   │
//! │  │   │ Management    │    │ PayoutRepository   │   │           │  │   │
//! │  │   └───────────────┘    │ AdminRepository    │   └───────────┘  │   │
//! │  │                        └────────────────────┘                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Port implementations (stock, purchase, payout, admin)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("postgres://localhost/stockroom");
//! let db = Database::new(config).await?;
//!
//! let stock = db.stocks().fetch("store-1", "stk-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::admin::AdminRepository;
pub use repository::payout::PayoutRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::reconcile::PgReconciliationFeed;
pub use repository::stock::StockRepository;
