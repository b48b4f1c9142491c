//! # Catalog Service
//!
//! Stock CRUD, the cached store listing, and replenishment.
//!
//! Every mutation follows the same tail: lifecycle event, then the two-key
//! listing invalidation. Reads are the only consumers of the cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use chrono::Utc;
use stockroom_core::alert::{evaluate_stock_level, minimum_top_up, top_up_clears_floor};
use stockroom_core::error::{CoreError, ValidationError};
use stockroom_core::events::{StockAlert, StockEvent, StockEventKind};
use stockroom_core::types::{MovementReason, NewStockItem, StockItem, StockPatch};
use stockroom_core::validation::{
    validate_identifier, validate_initial_quantity, validate_price_cents, validate_stock_name,
};

use crate::contracts::{cache_keys, Ports};
use crate::error::SettlementResult;

/// Default TTL for cached store listings.
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(600);

/// Result of a rebalance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceOutcome {
    pub store_id: String,
    pub stock_id: String,
    pub new_quantity: i64,
    pub alert_fired: bool,
}

/// Stock catalog operations for admins and storefront reads.
pub struct CatalogService {
    ports: Ports,
    listing_ttl: Duration,
}

impl CatalogService {
    pub fn new(ports: Ports) -> Self {
        Self::with_listing_ttl(ports, DEFAULT_LISTING_TTL)
    }

    pub fn with_listing_ttl(ports: Ports, listing_ttl: Duration) -> Self {
        CatalogService { ports, listing_ttl }
    }

    /// Creates a stock item owned by the acting admin.
    pub async fn create_stock(
        &self,
        acting_admin_id: &str,
        new: NewStockItem,
    ) -> SettlementResult<StockItem> {
        validate_identifier("storeId", &new.store_id).map_err(CoreError::from)?;
        validate_identifier("adminId", acting_admin_id).map_err(CoreError::from)?;
        validate_stock_name(&new.name).map_err(CoreError::from)?;
        validate_initial_quantity(new.quantity).map_err(CoreError::from)?;
        validate_price_cents(new.price_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        let item = StockItem {
            id: Uuid::new_v4().to_string(),
            store_id: new.store_id,
            admin_id: acting_admin_id.to_string(),
            name: new.name.trim().to_string(),
            quantity: new.quantity,
            price_cents: new.price_cents,
            created_at: now,
            updated_at: now,
        };
        self.ports.catalog.insert(&item).await?;

        let admin_email = self.ports.admin_email(&item.admin_id).await;
        let event =
            StockEvent::from_snapshot(StockEventKind::Added, &item, item.quantity, &admin_email, now);
        self.ports.emit(event.into()).await;
        self.ports.invalidate_listings(&item.store_id).await;

        info!(
            store_id = %item.store_id,
            stock_id = %item.id,
            quantity = item.quantity,
            "stock created"
        );
        Ok(item)
    }

    /// Fetches one stock item. Uncached; single-item reads are cheap.
    pub async fn get_stock(&self, store_id: &str, stock_id: &str) -> SettlementResult<StockItem> {
        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        validate_identifier("stockId", stock_id).map_err(CoreError::from)?;
        self.ports.catalog.fetch(store_id, stock_id).await
    }

    /// Lists a store's stocks through the listing cache.
    pub async fn list_stocks(&self, store_id: &str) -> SettlementResult<Vec<StockItem>> {
        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        self.listing_via_cache(&cache_keys::store_listing(store_id), Some(store_id))
            .await
    }

    /// Lists every stock across all stores through the listing cache.
    pub async fn list_all_stocks(&self) -> SettlementResult<Vec<StockItem>> {
        self.listing_via_cache(cache_keys::ALL_STOCKS, None).await
    }

    /// Read-through listing. A cache failure of any kind degrades to the
    /// catalog; an unreadable cached body is treated as a miss and
    /// overwritten.
    async fn listing_via_cache(
        &self,
        key: &str,
        store_id: Option<&str>,
    ) -> SettlementResult<Vec<StockItem>> {
        match self.ports.cache.read(key).await {
            Ok(Some(body)) => match serde_json::from_str::<Vec<StockItem>>(&body) {
                Ok(items) => {
                    debug!(key = %key, items = items.len(), "listing served from cache");
                    return Ok(items);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "cached listing unreadable, refetching");
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!(key = %key, error = %err, "listing cache read failed");
            }
        }

        let items = match store_id {
            Some(store) => self.ports.catalog.list_for_store(store).await?,
            None => self.ports.catalog.list_all().await?,
        };
        match serde_json::to_string(&items) {
            Ok(body) => {
                if let Err(err) = self.ports.cache.write(key, &body, self.listing_ttl).await {
                    warn!(key = %key, error = %err, "listing cache write failed");
                }
            }
            Err(err) => warn!(error = %err, "listing serialization failed"),
        }
        Ok(items)
    }

    /// Updates name and/or price. Only the owning admin may do this.
    pub async fn update_stock(
        &self,
        store_id: &str,
        stock_id: &str,
        acting_admin_id: &str,
        patch: StockPatch,
    ) -> SettlementResult<StockItem> {
        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        validate_identifier("stockId", stock_id).map_err(CoreError::from)?;
        validate_identifier("adminId", acting_admin_id).map_err(CoreError::from)?;
        if let Some(name) = &patch.name {
            validate_stock_name(name).map_err(CoreError::from)?;
        }
        if let Some(price) = patch.price_cents {
            validate_price_cents(price).map_err(CoreError::from)?;
        }

        let stock = self.ports.catalog.fetch(store_id, stock_id).await?;
        ensure_owner(&stock, acting_admin_id)?;

        // An empty patch changes nothing; skip the write and the fan-out.
        if patch.is_empty() {
            return Ok(stock);
        }

        let updated = self
            .ports
            .catalog
            .update_details(store_id, stock_id, &patch)
            .await?;

        let now = Utc::now();
        let admin_email = self.ports.admin_email(&updated.admin_id).await;
        let event = StockEvent::from_snapshot(
            StockEventKind::Updated,
            &updated,
            updated.quantity,
            &admin_email,
            now,
        );
        self.ports.emit(event.into()).await;
        self.ports.invalidate_listings(store_id).await;

        info!(store_id = %store_id, stock_id = %stock_id, "stock updated");
        Ok(updated)
    }

    /// Tops a stock item up. The top-up must clear the replenishment floor.
    pub async fn rebalance(
        &self,
        store_id: &str,
        stock_id: &str,
        acting_admin_id: &str,
        quantity_to_add: i64,
    ) -> SettlementResult<RebalanceOutcome> {
        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        validate_identifier("stockId", stock_id).map_err(CoreError::from)?;
        validate_identifier("adminId", acting_admin_id).map_err(CoreError::from)?;
        if quantity_to_add <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantityToAdd".to_string(),
            }
            .into());
        }

        let stock = self.ports.catalog.fetch(store_id, stock_id).await?;
        ensure_owner(&stock, acting_admin_id)?;

        if !top_up_clears_floor(stock.quantity, quantity_to_add) {
            return Err(CoreError::InsufficientTopUp {
                stock_id: stock.id.clone(),
                required: minimum_top_up(stock.quantity),
                offered: quantity_to_add,
            }
            .into());
        }

        // The movement references the admin who topped up, not an order.
        let new_quantity = self
            .ports
            .ledger
            .increment(
                store_id,
                stock_id,
                quantity_to_add,
                MovementReason::Rebalance,
                Some(acting_admin_id),
            )
            .await?;

        let now = Utc::now();
        let admin_email = self.ports.admin_email(&stock.admin_id).await;

        // Re-evaluate against the authoritative post-increment quantity. A
        // concurrent drain between fetch and increment can leave the item
        // below threshold even after a floor-clearing top-up.
        let decision = evaluate_stock_level(new_quantity);
        if decision.fired() {
            let alert = StockAlert::low_stock(&stock, new_quantity, &admin_email, now);
            self.ports.emit(alert.into()).await;
        }

        let event =
            StockEvent::from_snapshot(StockEventKind::Updated, &stock, new_quantity, &admin_email, now);
        self.ports.emit(event.into()).await;
        self.ports.invalidate_listings(store_id).await;

        info!(
            store_id = %store_id,
            stock_id = %stock_id,
            added = quantity_to_add,
            new_quantity,
            "stock rebalanced"
        );

        Ok(RebalanceOutcome {
            store_id: store_id.to_string(),
            stock_id: stock_id.to_string(),
            new_quantity,
            alert_fired: decision.fired(),
        })
    }

    /// Deletes a stock item and returns its final snapshot. Settled
    /// purchases keep their admin snapshot, so payouts are unaffected.
    pub async fn delete_stock(
        &self,
        store_id: &str,
        stock_id: &str,
        acting_admin_id: &str,
    ) -> SettlementResult<StockItem> {
        validate_identifier("storeId", store_id).map_err(CoreError::from)?;
        validate_identifier("stockId", stock_id).map_err(CoreError::from)?;
        validate_identifier("adminId", acting_admin_id).map_err(CoreError::from)?;

        let stock = self.ports.catalog.fetch(store_id, stock_id).await?;
        ensure_owner(&stock, acting_admin_id)?;

        let removed = self.ports.catalog.delete(store_id, stock_id).await?;

        let now = Utc::now();
        let admin_email = self.ports.admin_email(&removed.admin_id).await;
        let event = StockEvent::from_snapshot(
            StockEventKind::Removed,
            &removed,
            removed.quantity,
            &admin_email,
            now,
        );
        self.ports.emit(event.into()).await;
        self.ports.invalidate_listings(store_id).await;

        info!(store_id = %store_id, stock_id = %stock_id, "stock removed");
        Ok(removed)
    }
}

fn ensure_owner(stock: &StockItem, acting_admin_id: &str) -> SettlementResult<()> {
    if stock.admin_id != acting_admin_id {
        return Err(CoreError::NotAuthorized {
            admin_id: acting_admin_id.to_string(),
            stock_id: stock.id.clone(),
        }
        .into());
    }
    Ok(())
}
