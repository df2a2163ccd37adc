//! Kafka event producer
//!
//! Implements `EventProducer` on top of `rskafka`: all-replica acks,
//! random partition assignment, one record per send.

mod client;
mod config;

pub use client::KafkaClient;
pub use config::KafkaConfig;

use crate::error::Result;
use crate::provider::EventProducer;
use crate::types::{DeliveryReport, OutboundMessage};
use async_trait::async_trait;

/// Kafka event producer
///
/// Wraps `KafkaClient` and implements the `EventProducer` trait.
pub struct KafkaProducer {
    client: KafkaClient,
}

impl KafkaProducer {
    /// Connect to the configured brokers
    pub async fn connect(config: KafkaConfig) -> Result<Self> {
        let client = KafkaClient::connect(config).await?;
        Ok(Self { client })
    }

    /// Get the underlying Kafka client for advanced usage
    pub fn client(&self) -> &KafkaClient {
        &self.client
    }
}

#[async_trait]
impl EventProducer for KafkaProducer {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport> {
        let report = self.client.send(message).await?;

        tracing::info!(
            topic = %report.topic,
            key = message.key().unwrap_or_default(),
            partition = report.partition,
            offset = report.offset,
            "Send success"
        );

        Ok(report)
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }

    fn name(&self) -> &str {
        "kafka"
    }
}
