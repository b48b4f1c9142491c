//! # Reconciliation Sweep
//!
//! Report-only audit for purchase movements that never gained a purchase row.
//!
//! ## Sweep Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Reconciliation Sweep                           │
//! │                                                                     │
//! │  stock_movements (reason = PURCHASE, older than grace period)       │
//! │        │                                                            │
//! │        ▼                                                            │
//! │  matched by EITHER:                                                 │
//! │    • a purchase row with the same order reference, OR               │
//! │    • a REVERSAL movement carrying that reference                    │
//! │        │                                                            │
//! │        ▼                                                            │
//! │  unmatched ──► warn! per movement ──► ReconciliationReport          │
//! │                                                                     │
//! │  The sweep never mutates state. Orphans mean a decrement landed     │
//! │  but the recorder failed and no compensation ran; operators         │
//! │  resolve them by hand.                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use stockroom_core::types::StockMovement;

use crate::contracts::ReconciliationFeed;
use crate::error::{SettlementError, SettlementResult};

// =============================================================================
// Constants
// =============================================================================

/// Movements younger than this are skipped; the purchase row may still be
/// in flight.
pub const DEFAULT_GRACE: chrono::Duration = chrono::Duration::minutes(5);

/// Default pause between sweeps when running as a background task.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

// =============================================================================
// Report
// =============================================================================

/// Outcome of one sweep.
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    /// Purchase movements with no purchase row and no reversal.
    pub orphaned: Vec<StockMovement>,
    pub swept_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty()
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Runs the orphan audit against a [`ReconciliationFeed`].
#[derive(Clone)]
pub struct Reconciler {
    feed: Arc<dyn ReconciliationFeed>,
    grace: chrono::Duration,
}

impl Reconciler {
    pub fn new(feed: Arc<dyn ReconciliationFeed>) -> Self {
        Self::with_grace(feed, DEFAULT_GRACE)
    }

    pub fn with_grace(feed: Arc<dyn ReconciliationFeed>, grace: chrono::Duration) -> Self {
        Reconciler { feed, grace }
    }

    /// Audits movements once and reports every orphan it finds.
    pub async fn sweep(&self) -> SettlementResult<ReconciliationReport> {
        let orphaned = self.feed.unmatched_purchase_movements(self.grace).await?;

        for movement in &orphaned {
            warn!(
                movement_id = %movement.id,
                stock_id = %movement.stock_id,
                store_id = %movement.store_id,
                delta = movement.delta,
                reference = movement.reference.as_deref().unwrap_or("-"),
                occurred_at = %movement.occurred_at,
                "orphaned purchase movement"
            );
        }

        if orphaned.is_empty() {
            debug!("reconciliation sweep clean");
        } else {
            info!(orphans = orphaned.len(), "reconciliation sweep found orphans");
        }

        Ok(ReconciliationReport {
            orphaned,
            swept_at: Utc::now(),
        })
    }
}

// =============================================================================
// Background Task
// =============================================================================

/// Periodic sweep loop.
pub struct ReconcilerTask {
    reconciler: Reconciler,
    poll_interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the reconciler task.
#[derive(Clone)]
pub struct ReconcilerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ReconcilerHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SettlementResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SettlementError::storage("reconciler shutdown channel closed"))
    }
}

impl ReconcilerTask {
    /// Creates a new task and returns a handle.
    pub fn new(reconciler: Reconciler, poll_interval: Duration) -> (Self, ReconcilerHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = ReconcilerTask {
            reconciler,
            poll_interval,
            shutdown_rx,
        };

        (task, ReconcilerHandle { shutdown_tx })
    }

    /// Runs the sweep loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(interval_secs = self.poll_interval.as_secs(), "Reconciler starting");

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.reconciler.sweep().await {
                        error!(?e, "Reconciliation sweep failed");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Reconciler shutting down");
                    break;
                }
            }
        }

        info!("Reconciler stopped");
    }
}

// =============================================================================
// Tests
// =============================================================================
