//! # Reconciliation Feed
//!
//! The orphan query behind the reconciliation sweep.
//!
//! ## What Counts as Matched
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  purchase movement (reference = 'ord-1')                               │
//! │       │                                                                 │
//! │       ├── customer_purchases row with order_reference 'ord-1'?         │
//! │       │        └── matched: the settle completed                       │
//! │       │                                                                 │
//! │       ├── reversal movement with reference 'ord-1'?                    │
//! │       │        └── matched: the compensation path ran                  │
//! │       │                                                                 │
//! │       └── neither, and older than the grace window?                    │
//! │                └── ORPHAN: units left the shelf with no money trail    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The grace window keeps in-flight settles out of the report: a movement
//! written milliseconds ago legitimately has no purchase row yet.

use async_trait::async_trait;
use sqlx::PgPool;

use stockroom_core::types::StockMovement;
use stockroom_settlement::contracts::ReconciliationFeed;
use stockroom_settlement::SettlementError;

use crate::error::{DbError, DbResult};
use crate::repository::stock::MovementRow;

/// Pool-backed feed of unmatched purchase movements.
#[derive(Debug, Clone)]
pub struct PgReconciliationFeed {
    pool: PgPool,
}

impl PgReconciliationFeed {
    /// Creates a new PgReconciliationFeed.
    pub fn new(pool: PgPool) -> Self {
        PgReconciliationFeed { pool }
    }
}

#[async_trait]
impl ReconciliationFeed for PgReconciliationFeed {
    async fn unmatched_purchase_movements(
        &self,
        grace: chrono::Duration,
    ) -> Result<Vec<StockMovement>, SettlementError> {
        let cutoff = chrono::Utc::now() - grace;

        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT m.id, m.stock_id, m.store_id, m.delta, m.quantity_after,
                   m.reason, m.reference, m.occurred_at
            FROM stock_movements m
            LEFT JOIN customer_purchases p
                   ON p.order_reference = m.reference
            LEFT JOIN stock_movements r
                   ON r.reference = m.reference AND r.reason = 'reversal'
            WHERE m.reason = 'purchase'
              AND m.occurred_at <= $1
              AND p.id IS NULL
              AND r.id IS NULL
            ORDER BY m.occurred_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let movements = rows
            .into_iter()
            .map(MovementRow::into_movement)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(movements)
    }
}
