//! # Redis Stream Event Sink
//!
//! Appends domain events to Redis streams, one stream per topic.
//!
//! ## Wire Format
//! ```text
//! XADD stock-events * payload '{"event":"stock-purchased","id":...}'
//! XADD stock-alerts * payload '{"type":"LOW_STOCK","id":...}'
//! ```
//!
//! Consumers read with XREAD/consumer groups and parse the single `payload`
//! field. The JSON shape is the wire contract defined on the event types;
//! this adapter only moves bytes.

use async_trait::async_trait;
use tracing::debug;

use stockroom_core::events::DomainEvent;
use stockroom_settlement::contracts::{DownstreamError, DownstreamResult, EventSink};

use crate::client::RedisBus;

/// Stream-backed event sink.
#[derive(Clone)]
pub struct RedisEventSink {
    bus: RedisBus,
}

impl RedisEventSink {
    /// Creates a sink over the shared bus.
    pub fn new(bus: RedisBus) -> Self {
        RedisEventSink { bus }
    }
}

#[async_trait]
impl EventSink for RedisEventSink {
    async fn publish(&self, event: &DomainEvent) -> DownstreamResult {
        let payload = serde_json::to_string(event)
            .map_err(|err| DownstreamError::Encoding(err.to_string()))?;
        let topic = event.topic();

        let mut conn = self.bus.connection();
        let entry_id: String = self
            .bus
            .bounded("XADD", async move {
                redis::cmd("XADD")
                    .arg(topic)
                    .arg("*")
                    .arg("payload")
                    .arg(payload)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        debug!(topic = topic, entry = %entry_id, "event appended");
        Ok(())
    }
}
