//! # Redis Notification Queue
//!
//! Hands notification jobs to the out-of-process worker via LPUSH. The
//! worker BRPOPs from the other end, so the list behaves as a FIFO queue.
//!
//! Jobs are the serialized [`Notification`] JSON; address resolution and
//! template rendering belong to the worker, not to settlement.

use async_trait::async_trait;
use tracing::debug;

use stockroom_settlement::contracts::{
    DownstreamError, DownstreamResult, Notification, Notifier,
};

use crate::client::RedisBus;

/// Default list the email worker consumes.
pub const DEFAULT_QUEUE: &str = "notification-jobs";

/// List-backed notification queue.
#[derive(Clone)]
pub struct RedisNotifier {
    bus: RedisBus,
    queue: String,
}

impl RedisNotifier {
    /// Creates a notifier pushing to [`DEFAULT_QUEUE`].
    pub fn new(bus: RedisBus) -> Self {
        RedisNotifier {
            bus,
            queue: DEFAULT_QUEUE.to_string(),
        }
    }

    /// Overrides the queue name.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn notify(&self, note: &Notification) -> DownstreamResult {
        let payload = serde_json::to_string(note)
            .map_err(|err| DownstreamError::Encoding(err.to_string()))?;

        let queue = self.queue.clone();
        let mut conn = self.bus.connection();
        let depth: i64 = self
            .bus
            .bounded("LPUSH", async move {
                redis::cmd("LPUSH")
                    .arg(&queue)
                    .arg(payload)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        debug!(queue = %self.queue, depth = depth, kind = ?note.kind, "notification queued");
        Ok(())
    }
}
