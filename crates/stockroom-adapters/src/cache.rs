//! # Redis Listing Cache
//!
//! Key/value cache for stock listing bodies.
//!
//! Keys follow the shared vocabulary in the settlement contracts: `stocks`,
//! `stocks:{storeId}`. Bodies are the serialized JSON listings the read side
//! serves. Invalidation is a plain DEL; the next read repopulates lazily.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use stockroom_settlement::contracts::{DownstreamError, DownstreamResult, StockCache};

use crate::client::RedisBus;

/// Redis rejects `EX 0`, so sub-second TTLs clamp up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Redis-backed listing cache.
#[derive(Clone)]
pub struct RedisStockCache {
    bus: RedisBus,
}

impl RedisStockCache {
    /// Creates a cache over the shared bus.
    pub fn new(bus: RedisBus) -> Self {
        RedisStockCache { bus }
    }
}

#[async_trait]
impl StockCache for RedisStockCache {
    async fn invalidate(&self, keys: &[String]) -> DownstreamResult {
        if keys.is_empty() {
            return Ok(());
        }

        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }

        let mut conn = self.bus.connection();
        let removed: i64 = self
            .bus
            .bounded("DEL", async move { cmd.query_async(&mut conn).await })
            .await?;

        debug!(requested = keys.len(), removed = removed, "cache keys dropped");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>, DownstreamError> {
        let key = key.to_string();
        let mut conn = self.bus.connection();

        let body: Option<String> = self
            .bus
            .bounded("GET", async move {
                redis::cmd("GET").arg(&key).query_async(&mut conn).await
            })
            .await?;

        Ok(body)
    }

    async fn write(&self, key: &str, body: &str, ttl: Duration) -> DownstreamResult {
        let owned_key = key.to_string();
        let body = body.to_string();
        let secs = ttl_secs(ttl);
        let mut conn = self.bus.connection();

        let _: () = self
            .bus
            .bounded("SET", async move {
                redis::cmd("SET")
                    .arg(&owned_key)
                    .arg(&body)
                    .arg("EX")
                    .arg(secs)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        debug!(key = %key, ttl_secs = secs, "cache body written");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
