//! # Purchase Repository
//!
//! Database operations for the append-only purchase ledger.
//!
//! ## Idempotency Backstop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two settles of order "ord-1" race past the application pre-check:     │
//! │                                                                         │
//! │  A: INSERT ... order_reference = 'ord-1'   → row written               │
//! │  B: INSERT ... order_reference = 'ord-1'   → 23505 unique violation    │
//! │                                                                         │
//! │  The UNIQUE index on order_reference is the last word. This            │
//! │  repository maps 23505 to DuplicateOrder so the settlement flow        │
//! │  can compensate B's decrement and replay A's receipt.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use stockroom_core::error::CoreError;
use stockroom_core::types::{PaymentStatus, PurchaseRecord};
use stockroom_settlement::contracts::{PurchaseRecorder, WindowEarnings};
use stockroom_settlement::SettlementError;

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

/// Raw customer_purchases row.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    customer_id: Option<String>,
    stock_id: String,
    store_id: String,
    admin_id: String,
    quantity: i64,
    unit_price_cents: i64,
    total_cents: i64,
    order_reference: String,
    payment_status: String,
    purchased_at: DateTime<Utc>,
    confirmation_sent: bool,
}

impl PurchaseRow {
    fn into_record(self) -> DbResult<PurchaseRecord> {
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            DbError::Internal(format!(
                "unknown payment status '{}' on purchase {}",
                self.payment_status, self.id
            ))
        })?;

        Ok(PurchaseRecord {
            id: self.id,
            customer_id: self.customer_id,
            stock_id: self.stock_id,
            store_id: self.store_id,
            admin_id: self.admin_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            total_cents: self.total_cents,
            order_reference: self.order_reference,
            payment_status,
            purchased_at: self.purchased_at,
            confirmation_sent: self.confirmation_sent,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchase records.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: PgPool) -> Self {
        PurchaseRepository { pool }
    }
}

#[async_trait]
impl PurchaseRecorder for PurchaseRepository {
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), SettlementError> {
        debug!(
            id = %purchase.id,
            order = %purchase.order_reference,
            "Recording purchase"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO customer_purchases (
                id, customer_id, stock_id, store_id, admin_id,
                quantity, unit_price_cents, total_cents,
                order_reference, payment_status, purchased_at, confirmation_sent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.customer_id)
        .bind(&purchase.stock_id)
        .bind(&purchase.store_id)
        .bind(&purchase.admin_id)
        .bind(purchase.quantity)
        .bind(purchase.unit_price_cents)
        .bind(purchase.total_cents)
        .bind(&purchase.order_reference)
        .bind(purchase.payment_status.as_str())
        .bind(purchase.purchased_at)
        .bind(purchase.confirmation_sent)
        .execute(&self.pool)
        .await;

        match result.map_err(DbError::from) {
            Ok(_) => Ok(()),
            // Unique index on order_reference: the duplicate race was lost.
            Err(err) if err.is_unique_violation() => Err(SettlementError::Domain(
                CoreError::DuplicateOrder(purchase.order_reference.clone()),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_order(
        &self,
        order_reference: &str,
    ) -> Result<Option<PurchaseRecord>, SettlementError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, stock_id, store_id, admin_id,
                   quantity, unit_price_cents, total_cents,
                   order_reference, payment_status, purchased_at, confirmation_sent
            FROM customer_purchases
            WHERE order_reference = $1
            "#,
        )
        .bind(order_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        row.map(PurchaseRow::into_record)
            .transpose()
            .map_err(SettlementError::from)
    }

    async fn mark_confirmation_sent(&self, purchase_id: &str) -> Result<(), SettlementError> {
        let result = sqlx::query(
            "UPDATE customer_purchases SET confirmation_sent = TRUE WHERE id = $1",
        )
        .bind(purchase_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", purchase_id).into());
        }

        Ok(())
    }

    async fn window_earnings(
        &self,
        admin_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> Result<WindowEarnings, SettlementError> {
        // SUM over BIGINT is NUMERIC in Postgres; cast back down.
        let (purchase_count, gross_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)::BIGINT
            FROM customer_purchases
            WHERE admin_id = $1
              AND ($2::timestamptz IS NULL OR purchased_at > $2)
            "#,
        )
        .bind(admin_id)
        .bind(after)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(WindowEarnings {
            purchase_count,
            gross_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
