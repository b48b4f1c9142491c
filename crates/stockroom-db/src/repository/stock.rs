//! # Stock Repository
//!
//! Database operations for stock items and the movement ledger.
//!
//! ## The Floor-Checked Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why decrement is ONE conditional UPDATE                    │
//! │                                                                         │
//! │  BROKEN (read-modify-write):        CORRECT (this repository):         │
//! │                                                                         │
//! │  A: SELECT quantity → 1             A: UPDATE ... SET quantity =        │
//! │  B: SELECT quantity → 1                  quantity - 1                   │
//! │  A: 1 >= 1? yes, UPDATE → 0             WHERE quantity >= 1             │
//! │  B: 1 >= 1? yes, UPDATE → -1            RETURNING quantity   → Some(0)  │
//! │         └── oversold ──┘            B: same UPDATE           → None     │
//! │                                          └── loser sees the floor ──┘   │
//! │                                                                         │
//! │  The movement audit row is written in the same transaction, so the     │
//! │  ledger never shows a quantity change without its movement (or the     │
//! │  other way around).                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use stockroom_core::error::CoreError;
use stockroom_core::types::{MovementReason, StockItem, StockMovement, StockPatch};
use stockroom_settlement::contracts::{StockCatalog, StockLedger};
use stockroom_settlement::SettlementError;

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

/// Raw stocks row. Converted to [`StockItem`] at the repository edge.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: String,
    store_id: String,
    admin_id: String,
    name: String,
    quantity: i64,
    price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRow> for StockItem {
    fn from(row: StockRow) -> Self {
        StockItem {
            id: row.id,
            store_id: row.store_id,
            admin_id: row.admin_id,
            name: row.name,
            quantity: row.quantity,
            price_cents: row.price_cents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw stock_movements row. The reason column is free text in the database;
/// parsing it is the only way this conversion can fail.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MovementRow {
    pub(crate) id: String,
    pub(crate) stock_id: String,
    pub(crate) store_id: String,
    pub(crate) delta: i64,
    pub(crate) quantity_after: i64,
    pub(crate) reason: String,
    pub(crate) reference: Option<String>,
    pub(crate) occurred_at: DateTime<Utc>,
}

impl MovementRow {
    pub(crate) fn into_movement(self) -> DbResult<StockMovement> {
        let reason = MovementReason::parse(&self.reason).ok_or_else(|| {
            DbError::Internal(format!(
                "unknown movement reason '{}' on movement {}",
                self.reason, self.id
            ))
        })?;

        Ok(StockMovement {
            id: self.id,
            stock_id: self.stock_id,
            store_id: self.store_id,
            delta: self.delta,
            quantity_after: self.quantity_after,
            reason,
            reference: self.reference,
            occurred_at: self.occurred_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock items and movements.
///
/// Implements both [`StockCatalog`] (CRUD) and [`StockLedger`] (atomic
/// quantity movements) over the same pool.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: PgPool) -> Self {
        StockRepository { pool }
    }

    /// Writes one movement audit row inside the caller's transaction.
    async fn insert_movement(
        tx: &mut Transaction<'_, Postgres>,
        stock_id: &str,
        store_id: &str,
        delta: i64,
        quantity_after: i64,
        reason: MovementReason,
        reference: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, stock_id, store_id, delta, quantity_after,
                reason, reference, occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(stock_id)
        .bind(store_id)
        .bind(delta)
        .bind(quantity_after)
        .bind(reason.as_str())
        .bind(reference)
        .bind(occurred_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

// =============================================================================
// StockCatalog
// =============================================================================

#[async_trait]
impl StockCatalog for StockRepository {
    async fn insert(&self, item: &StockItem) -> Result<(), SettlementError> {
        debug!(id = %item.id, store_id = %item.store_id, "Inserting stock");

        sqlx::query(
            r#"
            INSERT INTO stocks (
                id, store_id, admin_id, name,
                quantity, price_cents, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.store_id)
        .bind(&item.admin_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.price_cents)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    async fn fetch(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError> {
        let row: Option<StockRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, admin_id, name,
                   quantity, price_cents, created_at, updated_at
            FROM stocks
            WHERE store_id = $1 AND id = $2
            "#,
        )
        .bind(store_id)
        .bind(stock_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        row.map(StockItem::from)
            .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id).into())
    }

    async fn list_for_store(&self, store_id: &str) -> Result<Vec<StockItem>, SettlementError> {
        let rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, admin_id, name,
                   quantity, price_cents, created_at, updated_at
            FROM stocks
            WHERE store_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<StockItem>, SettlementError> {
        let rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, admin_id, name,
                   quantity, price_cents, created_at, updated_at
            FROM stocks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    async fn update_details(
        &self,
        store_id: &str,
        stock_id: &str,
        patch: &StockPatch,
    ) -> Result<StockItem, SettlementError> {
        let row: Option<StockRow> = sqlx::query_as(
            r#"
            UPDATE stocks SET
                name = COALESCE($3, name),
                price_cents = COALESCE($4, price_cents),
                updated_at = $5
            WHERE store_id = $1 AND id = $2
            RETURNING id, store_id, admin_id, name,
                      quantity, price_cents, created_at, updated_at
            "#,
        )
        .bind(store_id)
        .bind(stock_id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.price_cents)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        row.map(StockItem::from)
            .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id).into())
    }

    async fn delete(&self, store_id: &str, stock_id: &str) -> Result<StockItem, SettlementError> {
        debug!(store_id = %store_id, stock_id = %stock_id, "Deleting stock");

        let row: Option<StockRow> = sqlx::query_as(
            r#"
            DELETE FROM stocks
            WHERE store_id = $1 AND id = $2
            RETURNING id, store_id, admin_id, name,
                      quantity, price_cents, created_at, updated_at
            "#,
        )
        .bind(store_id)
        .bind(stock_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        row.map(StockItem::from)
            .ok_or_else(|| CoreError::stock_not_found(store_id, stock_id).into())
    }
}

// =============================================================================
// StockLedger
// =============================================================================

#[async_trait]
impl StockLedger for StockRepository {
    async fn decrement(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        order_reference: &str,
    ) -> Result<i64, SettlementError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // The floor check and the subtraction are one statement. Zero rows
        // means the condition lost, not that anything changed.
        let after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stocks SET
                quantity = quantity - $3,
                updated_at = $4
            WHERE store_id = $1 AND id = $2 AND quantity >= $3
            RETURNING quantity
            "#,
        )
        .bind(store_id)
        .bind(stock_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let Some(after) = after else {
            // Distinguish "too few units" from "no such item".
            let available: Option<i64> = sqlx::query_scalar(
                "SELECT quantity FROM stocks WHERE store_id = $1 AND id = $2",
            )
            .bind(store_id)
            .bind(stock_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?;

            return match available {
                Some(available) => Err(CoreError::InsufficientStock {
                    stock_id: stock_id.to_string(),
                    available,
                    requested: quantity,
                }
                .into()),
                None => Err(CoreError::stock_not_found(store_id, stock_id).into()),
            };
        };

        Self::insert_movement(
            &mut tx,
            stock_id,
            store_id,
            -quantity,
            after,
            MovementReason::Purchase,
            Some(order_reference),
            now,
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            stock_id = %stock_id,
            quantity = quantity,
            after = after,
            "Stock decremented"
        );

        Ok(after)
    }

    async fn increment(
        &self,
        store_id: &str,
        stock_id: &str,
        quantity: i64,
        reason: MovementReason,
        reference: Option<&str>,
    ) -> Result<i64, SettlementError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stocks SET
                quantity = quantity + $3,
                updated_at = $4
            WHERE store_id = $1 AND id = $2
            RETURNING quantity
            "#,
        )
        .bind(store_id)
        .bind(stock_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let Some(after) = after else {
            return Err(CoreError::stock_not_found(store_id, stock_id).into());
        };

        Self::insert_movement(
            &mut tx,
            stock_id,
            store_id,
            quantity,
            after,
            reason,
            reference,
            now,
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            stock_id = %stock_id,
            quantity = quantity,
            after = after,
            reason = reason.as_str(),
            "Stock incremented"
        );

        Ok(after)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_row_parses_known_reason() {
        let row = MovementRow {
            id: "mov-1".to_string(),
            stock_id: "stk-1".to_string(),
            store_id: "store-1".to_string(),
            delta: -2,
            quantity_after: 8,
            reason: "purchase".to_string(),
            reference: Some("ord-1".to_string()),
            occurred_at: Utc::now(),
        };

        let movement = row.into_movement().unwrap();
        assert_eq!(movement.reason, MovementReason::Purchase);
        assert_eq!(movement.delta, -2);
    }

    #[test]
    fn test_movement_row_rejects_unknown_reason() {
        let row = MovementRow {
            id: "mov-2".to_string(),
            stock_id: "stk-1".to_string(),
            store_id: "store-1".to_string(),
            delta: 5,
            quantity_after: 13,
            reason: "mystery".to_string(),
            reference: None,
            occurred_at: Utc::now(),
        };

        assert!(row.into_movement().is_err());
    }
}
