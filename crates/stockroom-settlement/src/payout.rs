//! # Payout Calculation
//!
//! Windowed commission payouts per admin.
//!
//! ## The Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  time ──────────────────────────────────────────────────────►          │
//! │                                                                         │
//! │        payout A                 payout B                now             │
//! │  ──────────┼──────────────────────┼──────────────────────┼──           │
//! │            │  window for B        │  window for next     │             │
//! │            └──────────────────────┘──────────────────────┘             │
//! │                                                                         │
//! │  A window is every purchase attributed to the admin with               │
//! │  purchased_at STRICTLY after the previous payout's paid_at.            │
//! │  No previous payout means "since forever".                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payout writes are serialized per admin with an in-process keyed mutex,
//! so two concurrent requests cannot both read the same last-payout row and
//! double-pay the window. Single-process deployment assumption; a database
//! advisory lock takes over if the API ever scales out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use stockroom_core::commission::CommissionTier;
use stockroom_core::error::CoreError;
use stockroom_core::money::Money;
use stockroom_core::types::{EarningsStatement, Payout};
use stockroom_core::validation::validate_identifier;

use crate::contracts::{PayoutStore, PurchaseRecorder};
use crate::error::SettlementResult;

/// Computes and records payouts over purchase windows.
pub struct PayoutCalculator {
    recorder: Arc<dyn PurchaseRecorder>,
    payouts: Arc<dyn PayoutStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PayoutCalculator {
    pub fn new(recorder: Arc<dyn PurchaseRecorder>, payouts: Arc<dyn PayoutStore>) -> Self {
        PayoutCalculator {
            recorder,
            payouts,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Pays the admin's pending window and records the payout row, stamped
    /// with the super admin who triggered it.
    ///
    /// Fails with `NothingToPay` when the window has no earnings, so the
    /// window boundary only advances on real money movement.
    pub async fn run_payout(&self, admin_id: &str, paid_by: &str) -> SettlementResult<Payout> {
        validate_identifier("adminId", admin_id).map_err(CoreError::from)?;
        validate_identifier("paidBy", paid_by).map_err(CoreError::from)?;

        let lock = self.lock_for(admin_id).await;
        let _guard = lock.lock().await;

        let last = self.payouts.last_payout(admin_id).await?;
        let window_start = last.as_ref().map(|p| p.paid_at);
        let earnings = self.recorder.window_earnings(admin_id, window_start).await?;

        debug!(
            admin_id = %admin_id,
            purchases = earnings.purchase_count,
            gross = %Money::from_cents(earnings.gross_cents),
            "payout window computed"
        );

        if earnings.gross_cents <= 0 {
            return Err(CoreError::NothingToPay {
                admin_id: admin_id.to_string(),
            }
            .into());
        }

        let plan_id = self.payouts.active_plan_id(admin_id).await?;
        let tier = CommissionTier::from_plan_id(plan_id);
        let rate = tier.rate();
        let gross = Money::from_cents(earnings.gross_cents);
        let net = rate.net_of(gross);

        let payout = Payout {
            id: Uuid::new_v4().to_string(),
            admin_id: admin_id.to_string(),
            gross_cents: gross.cents(),
            amount_cents: net.cents(),
            rate_bps: rate.bps(),
            paid_by: paid_by.to_string(),
            paid_at: Utc::now(),
        };
        self.payouts.insert(&payout).await?;

        info!(
            admin_id = %admin_id,
            paid_by = %paid_by,
            tier = tier.as_str(),
            gross = %gross,
            amount = %net,
            purchases = earnings.purchase_count,
            "payout recorded"
        );

        Ok(payout)
    }

    /// Read-only preview of the pending window. Writes nothing, takes no
    /// lock; the numbers are advisory until `run_payout` fixes them.
    pub async fn earnings(&self, admin_id: &str) -> SettlementResult<EarningsStatement> {
        validate_identifier("adminId", admin_id).map_err(CoreError::from)?;

        let last = self.payouts.last_payout(admin_id).await?;
        let window_start = last.as_ref().map(|p| p.paid_at);
        let earnings = self.recorder.window_earnings(admin_id, window_start).await?;

        let plan_id = self.payouts.active_plan_id(admin_id).await?;
        let rate = CommissionTier::from_plan_id(plan_id).rate();
        let gross = Money::from_cents(earnings.gross_cents);
        let net = rate.net_of(gross);

        Ok(EarningsStatement {
            admin_id: admin_id.to_string(),
            window_start,
            purchase_count: earnings.purchase_count,
            gross_cents: gross.cents(),
            rate_bps: rate.bps(),
            commission_cents: (gross - net).cents(),
            net_cents: net.cents(),
        })
    }

    /// Payout history, newest first.
    pub async fn history(&self, admin_id: &str) -> SettlementResult<Vec<Payout>> {
        validate_identifier("adminId", admin_id).map_err(CoreError::from)?;
        self.payouts.history(admin_id).await
    }

    /// One mutex per admin, created on first use. The outer map lock is held
    /// only long enough to clone the entry out.
    async fn lock_for(&self, admin_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(admin_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
