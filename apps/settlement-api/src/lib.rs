//! # Stockroom Settlement API
//!
//! HTTP server exposing the settlement core.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement API Surface                             │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌───────────────────┐ │
//! │  │  Storefront        │  │  Admin             │  │  Super Admin      │ │
//! │  │                    │  │                    │  │                   │ │
//! │  │ • POST  purchase   │  │ • POST   stocks    │  │ • POST  payout    │ │
//! │  │ • GET   stocks     │  │ • PUT    stocks    │  │ • GET   earnings  │ │
//! │  │ • GET   store      │  │ • DELETE stocks    │  │ • GET   payouts   │ │
//! │  │         stocks     │  │ • POST   rebalance │  │                   │ │
//! │  └────────────────────┘  └────────────────────┘  └───────────────────┘ │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                              │  │
//! │  │                                                                  │  │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌────────────────────┐ │  │
//! │  │  │  PostgreSQL  │  │     Redis        │  │  Reconciler        │ │  │
//! │  │  │              │  │                  │  │                    │ │  │
//! │  │  │ Ledger and   │  │ Event streams    │  │ Periodic orphan    │ │  │
//! │  │  │ purchases    │  │ Listing cache    │  │ sweep              │ │  │
//! │  │  └──────────────┘  │ Notify queue     │  └────────────────────┘ │  │
//! │  │                    └──────────────────┘                         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `REDIS_URL` - Redis connection string (default: redis://127.0.0.1:6379)
//! - `HTTP_PORT` - HTTP server port (default: 8080)
//! - `REDIS_OP_TIMEOUT_MS` - per-call Redis budget (default: 250)
//! - `LISTING_TTL_SECS` - listing cache TTL (default: 600)
//! - `RECONCILE_INTERVAL_SECS` - sweep interval (default: 300)
//! - `RECONCILE_GRACE_SECS` - orphan grace window (default: 300)

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
