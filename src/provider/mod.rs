//! Event producer trait, the core abstraction for broker backends
//!
//! Backends (Kafka, in-memory) implement `EventProducer` to provide a
//! uniform "send a keyed message to a topic" API with a fixed delivery
//! policy: acknowledgement from all in-sync replicas and random partition
//! assignment.

use crate::error::Result;
use crate::types::{DeliveryReport, OutboundMessage};
use async_trait::async_trait;

pub mod kafka;
pub mod memory;

/// Core trait for broker backends
#[async_trait]
pub trait EventProducer: Send + Sync {
    /// Send a message and wait for the broker's acknowledgement
    ///
    /// Returns only once every in-sync replica has the write, or with an
    /// error. The returned report is the explicit success signal.
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport>;

    /// Release the underlying transport
    ///
    /// Call once at shutdown. Closing twice, or sending after close,
    /// returns `TransportClosed`.
    async fn close(&self) -> Result<()>;

    /// Producer name (e.g., "kafka", "memory")
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: EventProducer + ?Sized> EventProducer for std::sync::Arc<P> {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport> {
        (**self).send(message).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
