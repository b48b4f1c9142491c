//! # Redis Connection Handling
//!
//! One multiplexed connection shared by every adapter, plus the timeout
//! wrapper that makes the downstream side safe to call from the settlement
//! flows.
//!
//! ## Why Every Call Is Bounded
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The downstream ports are best-effort: a purchase MUST NOT hang         │
//! │  because Redis is slow. The budget per call is op_timeout (250ms by     │
//! │  default), after which the caller gets DownstreamError::Timeout and    │
//! │  moves on. The connection manager reconnects in the background.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use redis::aio::ConnectionManager;
use tracing::info;

use stockroom_settlement::contracts::DownstreamError;

/// Default per-call budget for downstream Redis operations.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// Shared Redis handle with a per-call timeout.
///
/// Cloning is cheap: the connection manager is a handle onto one multiplexed
/// connection with automatic reconnection.
#[derive(Clone)]
pub struct RedisBus {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisBus {
    /// Connects to Redis and hands back a bus with the default timeout.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let bus = RedisBus::connect("redis://127.0.0.1:6379").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Redis connection established");

        Ok(RedisBus {
            conn,
            op_timeout: DEFAULT_OP_TIMEOUT,
        })
    }

    /// Overrides the per-call timeout.
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// A fresh handle onto the shared connection for one command.
    pub(crate) fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Runs one Redis operation under the timeout budget.
    pub(crate) async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, DownstreamError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(DownstreamError::unavailable(op, err.to_string())),
            Err(_) => Err(DownstreamError::timeout(op)),
        }
    }

    /// Round-trips a PING. Used by health checks.
    pub async fn ping(&self) -> Result<(), DownstreamError> {
        let mut conn = self.connection();
        let _: String = self
            .bounded("PING", async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;
        Ok(())
    }
}
