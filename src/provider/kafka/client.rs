//! Kafka client: connection, partition choice and produce requests

use super::config::KafkaConfig;
use crate::error::{EventError, Result};
use crate::types::{DeliveryReport, OutboundMessage, PartitionPolicy};
use rand::Rng;
use rskafka::client::partition::{Compression, UnknownTopicHandling};
use rskafka::client::{Client, ClientBuilder};
use rskafka::record::Record;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Kafka producer client
///
/// Owns the broker connection for its lifetime. Produce requests are sent
/// with `acks = -1`, so a send completes only once all in-sync replicas
/// have the record.
pub struct KafkaClient {
    /// `None` once closed
    client: RwLock<Option<Arc<Client>>>,

    /// topic → partition count, from cluster metadata
    partitions: Mutex<HashMap<String, i32>>,

    config: KafkaConfig,
}

impl KafkaClient {
    /// Connect to the bootstrap brokers
    pub async fn connect(config: KafkaConfig) -> Result<Self> {
        config.validate()?;

        let client = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            ClientBuilder::new(config.brokers.clone()).build(),
        )
        .await
        .map_err(|_| {
            EventError::Connection(format!(
                "{:?}: timed out after {}s",
                config.brokers, config.connect_timeout_secs
            ))
        })?
        .map_err(|e| EventError::Connection(format!("{:?}: {}", config.brokers, e)))?;

        tracing::info!(brokers = ?config.brokers, "Connected to Kafka");

        Ok(Self {
            client: RwLock::new(Some(Arc::new(client))),
            partitions: Mutex::new(HashMap::new()),
            config,
        })
    }

    /// Produce one message, bounded by the request timeout
    pub async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);

        tokio::time::timeout(timeout, self.produce(message))
            .await
            .map_err(|_| {
                EventError::Timeout(format!(
                    "Send to topic '{}' timed out after {}s",
                    message.topic(),
                    self.config.request_timeout_secs
                ))
            })?
    }

    async fn produce(&self, message: &OutboundMessage) -> Result<DeliveryReport> {
        let client = self.client().await?;
        let topic = message.topic();

        let partition_count = self.partition_count(&client, topic).await?;
        let partition = choose_partition(message.partition_policy(), partition_count);

        let partition_client = client
            .partition_client(topic, partition, UnknownTopicHandling::Error)
            .await
            .map_err(|e| EventError::PublishFailed {
                topic: topic.to_string(),
                reason: format!("partition {} unavailable: {}", partition, e),
            })?;

        let record = Record {
            key: message.key().map(|k| k.as_bytes().to_vec()),
            value: Some(message.value().to_vec()),
            headers: Default::default(),
            timestamp: chrono::Utc::now(),
        };

        let offsets = partition_client
            .produce(vec![record], Compression::NoCompression)
            .await
            .map_err(|e| EventError::PublishFailed {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;

        let offset = offsets.first().copied().ok_or_else(|| EventError::PublishFailed {
            topic: topic.to_string(),
            reason: "broker acknowledged without an offset".to_string(),
        })?;

        Ok(DeliveryReport {
            topic: topic.to_string(),
            partition,
            offset,
        })
    }

    /// Release the broker connection
    pub async fn close(&self) -> Result<()> {
        match self.client.write().await.take() {
            Some(_) => {
                tracing::info!(brokers = ?self.config.brokers, "Kafka producer closed");
                Ok(())
            }
            None => Err(EventError::TransportClosed(
                "Kafka producer already closed".to_string(),
            )),
        }
    }

    /// Whether `close` has been called
    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }

    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }

    async fn client(&self) -> Result<Arc<Client>> {
        self.client.read().await.clone().ok_or_else(|| {
            EventError::TransportClosed("Kafka producer already closed".to_string())
        })
    }

    async fn partition_count(&self, client: &Client, topic: &str) -> Result<i32> {
        if let Some(count) = self.partitions.lock().await.get(topic) {
            return Ok(*count);
        }

        let topics = client
            .list_topics()
            .await
            .map_err(|e| EventError::PublishFailed {
                topic: topic.to_string(),
                reason: format!("metadata request failed: {}", e),
            })?;

        let count = topics
            .iter()
            .find(|t| t.name == topic)
            .map(|t| t.partitions.len() as i32)
            .filter(|count| *count > 0)
            .ok_or_else(|| EventError::PublishFailed {
                topic: topic.to_string(),
                reason: "topic has no partitions in cluster metadata".to_string(),
            })?;

        tracing::debug!(topic = topic, partitions = count, "Topic metadata loaded");
        self.partitions.lock().await.insert(topic.to_string(), count);
        Ok(count)
    }
}

impl Drop for KafkaClient {
    fn drop(&mut self) {
        if self.client.get_mut().take().is_some() {
            tracing::debug!(brokers = ?self.config.brokers, "Kafka producer dropped without close");
        }
    }
}

/// Pick the partition for a message
fn choose_partition(policy: PartitionPolicy, partition_count: i32) -> i32 {
    match policy {
        PartitionPolicy::Random => rand::thread_rng().gen_range(0..partition_count.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_partition_in_range() {
        for _ in 0..200 {
            let p = choose_partition(PartitionPolicy::Random, 6);
            assert!((0..6).contains(&p));
        }
    }

    #[test]
    fn test_random_partition_spreads() {
        let seen: std::collections::HashSet<i32> = (0..500)
            .map(|_| choose_partition(PartitionPolicy::Random, 3))
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_single_partition() {
        assert_eq!(choose_partition(PartitionPolicy::Random, 1), 0);
        assert_eq!(choose_partition(PartitionPolicy::Random, 0), 0);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        let result = KafkaClient::connect(KafkaConfig {
            brokers: vec![],
            ..Default::default()
        })
        .await;
        assert!(matches!(result, Err(EventError::Config(_))));
    }
}
