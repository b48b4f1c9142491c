//! # stockroom-adapters: Redis Downstream Adapters
//!
//! Production implementations of the best-effort downstream ports.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Downstream Side                                  │
//! │                                                                         │
//! │  Settlement flows                                                       │
//! │       │                                                                 │
//! │       ├── EventSink::publish ──► RedisEventSink ──► XADD stock-events  │
//! │       │                                             XADD stock-alerts  │
//! │       │                                                                 │
//! │       ├── StockCache::* ───────► RedisStockCache ─► GET/SET/DEL        │
//! │       │                                             stocks, stocks:{s} │
//! │       │                                                                 │
//! │       └── Notifier::notify ────► RedisNotifier ───► LPUSH              │
//! │                                                     notification-jobs  │
//! │                                                                         │
//! │  All three share one RedisBus: a connection-manager handle plus a      │
//! │  per-call timeout. A slow or dead Redis costs the caller at most the   │
//! │  timeout, never the settlement.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Shared connection handle and timeout wrapper
//! - [`events`] - Stream-based event log publisher
//! - [`cache`] - Listing cache over GET/SET/DEL
//! - [`notify`] - Notification job queue over LPUSH

pub mod cache;
pub mod client;
pub mod events;
pub mod notify;

pub use cache::RedisStockCache;
pub use client::{RedisBus, DEFAULT_OP_TIMEOUT};
pub use events::RedisEventSink;
pub use notify::{RedisNotifier, DEFAULT_QUEUE};
