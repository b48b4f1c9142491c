//! Shared application state.
//!
//! One [`AppState`] is built at startup and cloned into every handler. The
//! services inside are wired over the port bundle, so tests assemble the
//! same state from the in-memory ports and production assembles it from
//! PostgreSQL and Redis adapters.

use std::sync::Arc;
use std::time::Duration;

use stockroom_adapters::RedisBus;
use stockroom_db::Database;
use stockroom_settlement::{CatalogService, PayoutCalculator, Ports, PurchaseSettlement};

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub settlement: Arc<PurchaseSettlement>,
    pub catalog: Arc<CatalogService>,
    pub payouts: Arc<PayoutCalculator>,

    /// Present only when wired against PostgreSQL; health checks skip it
    /// otherwise.
    pub db: Option<Database>,

    /// Present only when the Redis connection came up at startup.
    pub redis: Option<RedisBus>,
}

impl AppState {
    /// Builds the service layer over a port bundle.
    pub fn new(ports: Ports, listing_ttl: Duration) -> Self {
        let payouts = PayoutCalculator::new(ports.recorder.clone(), ports.payouts.clone());
        AppState {
            settlement: Arc::new(PurchaseSettlement::new(ports.clone())),
            catalog: Arc::new(CatalogService::with_listing_ttl(ports, listing_ttl)),
            payouts: Arc::new(payouts),
            db: None,
            redis: None,
        }
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_redis(mut self, bus: RedisBus) -> Self {
        self.redis = Some(bus);
        self
    }
}
