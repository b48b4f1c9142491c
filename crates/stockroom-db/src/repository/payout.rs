//! # Payout Repository
//!
//! Database operations for payout rows and subscription plan lookups.
//!
//! The most recent payout's `paid_at` is the lower bound of the next payout
//! window, so `last_payout` ordering matters: always `paid_at DESC LIMIT 1`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use stockroom_core::types::Payout;
use stockroom_settlement::contracts::PayoutStore;
use stockroom_settlement::SettlementError;

use crate::error::DbError;

// =============================================================================
// Row Types
// =============================================================================

/// Raw payouts row. `rate_bps` is INTEGER in the schema; the domain type is
/// unsigned.
#[derive(Debug, sqlx::FromRow)]
struct PayoutRow {
    id: String,
    admin_id: String,
    gross_cents: i64,
    amount_cents: i64,
    rate_bps: i32,
    paid_by: String,
    paid_at: DateTime<Utc>,
}

impl From<PayoutRow> for Payout {
    fn from(row: PayoutRow) -> Self {
        Payout {
            id: row.id,
            admin_id: row.admin_id,
            gross_cents: row.gross_cents,
            amount_cents: row.amount_cents,
            rate_bps: u32::try_from(row.rate_bps).unwrap_or_default(),
            paid_by: row.paid_by,
            paid_at: row.paid_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for payout rows and the active-plan lookup.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: PgPool,
}

impl PayoutRepository {
    /// Creates a new PayoutRepository.
    pub fn new(pool: PgPool) -> Self {
        PayoutRepository { pool }
    }
}

#[async_trait]
impl PayoutStore for PayoutRepository {
    async fn last_payout(&self, admin_id: &str) -> Result<Option<Payout>, SettlementError> {
        let row: Option<PayoutRow> = sqlx::query_as(
            r#"
            SELECT id, admin_id, gross_cents, amount_cents, rate_bps, paid_by, paid_at
            FROM payouts
            WHERE admin_id = $1
            ORDER BY paid_at DESC
            LIMIT 1
            "#,
        )
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.map(Payout::from))
    }

    async fn insert(&self, payout: &Payout) -> Result<(), SettlementError> {
        debug!(
            id = %payout.id,
            admin_id = %payout.admin_id,
            amount_cents = payout.amount_cents,
            "Inserting payout"
        );

        sqlx::query(
            r#"
            INSERT INTO payouts (
                id, admin_id, gross_cents, amount_cents, rate_bps, paid_by, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&payout.id)
        .bind(&payout.admin_id)
        .bind(payout.gross_cents)
        .bind(payout.amount_cents)
        .bind(payout.rate_bps as i32)
        .bind(&payout.paid_by)
        .bind(payout.paid_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    async fn active_plan_id(&self, admin_id: &str) -> Result<Option<i64>, SettlementError> {
        let plan_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT plan_id
            FROM admin_subscriptions
            WHERE admin_id = $1 AND active
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(plan_id)
    }

    async fn history(&self, admin_id: &str) -> Result<Vec<Payout>, SettlementError> {
        let rows: Vec<PayoutRow> = sqlx::query_as(
            r#"
            SELECT id, admin_id, gross_cents, amount_cents, rate_bps, paid_by, paid_at
            FROM payouts
            WHERE admin_id = $1
            ORDER BY paid_at DESC
            "#,
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows.into_iter().map(Payout::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
