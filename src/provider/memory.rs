//! In-memory event producer
//!
//! Records every sent message instead of talking to a broker. Can be
//! configured to reject all sends, which lets callers exercise their
//! publish-failure paths.

use crate::error::{EventError, Result};
use crate::provider::EventProducer;
use crate::types::{DeliveryReport, OutboundMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Configuration for the in-memory producer
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Partitions per topic; offsets are tracked per partition
    pub partitions: i32,

    /// When set, every send fails with this reason
    pub fail_with: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            partitions: 1,
            fail_with: None,
        }
    }
}

/// In-memory producer for development and testing
pub struct MemoryProducer {
    config: MemoryConfig,
    sent: RwLock<Vec<OutboundMessage>>,
    /// (topic, partition) → next offset
    offsets: RwLock<HashMap<(String, i32), i64>>,
    closed: AtomicBool,
}

impl MemoryProducer {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            sent: RwLock::new(Vec::new()),
            offsets: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// A producer whose sends always fail
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(MemoryConfig {
            fail_with: Some(reason.into()),
            ..Default::default()
        })
    }

    /// Messages accepted so far, in send order
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MemoryProducer {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl EventProducer for MemoryProducer {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport> {
        if self.is_closed() {
            return Err(EventError::TransportClosed(
                "Memory producer already closed".to_string(),
            ));
        }

        if let Some(ref reason) = self.config.fail_with {
            return Err(EventError::PublishFailed {
                topic: message.topic().to_string(),
                reason: reason.clone(),
            });
        }

        let partition = if self.config.partitions > 1 {
            use rand::Rng;
            rand::thread_rng().gen_range(0..self.config.partitions)
        } else {
            0
        };

        let offset = {
            let mut offsets = self.offsets.write().map_err(|e| EventError::PublishFailed {
                topic: message.topic().to_string(),
                reason: format!("offset lock poisoned: {}", e),
            })?;
            let next = offsets
                .entry((message.topic().to_string(), partition))
                .or_insert(0);
            let offset = *next;
            *next += 1;
            offset
        };

        self.sent
            .write()
            .map_err(|e| EventError::PublishFailed {
                topic: message.topic().to_string(),
                reason: format!("message lock poisoned: {}", e),
            })?
            .push(message.clone());

        tracing::info!(
            topic = message.topic(),
            key = message.key().unwrap_or_default(),
            partition = partition,
            offset = offset,
            "Send success"
        );

        Ok(DeliveryReport {
            topic: message.topic().to_string(),
            partition,
            offset,
        })
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(EventError::TransportClosed(
                "Memory producer already closed".to_string(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn message(topic: &str) -> OutboundMessage {
        OutboundMessage::with_random_key(topic, Bytes::from_static(b"\0\0\0\0\x01\x02"))
    }

    #[tokio::test]
    async fn test_send_records_message_and_offsets() {
        let producer = MemoryProducer::default();

        let first = producer.send(&message("orders")).await.unwrap();
        let second = producer.send(&message("orders")).await.unwrap();
        let other = producer.send(&message("payments")).await.unwrap();

        assert_eq!(first.offset, 0);
        assert_eq!(second.offset, 1);
        assert_eq!(other.offset, 0);
        assert_eq!(producer.sent().len(), 3);
        assert_eq!(producer.sent()[2].topic(), "payments");
    }

    #[tokio::test]
    async fn test_failing_producer() {
        let producer = MemoryProducer::failing("broker down");
        let err = producer.send(&message("orders")).await.unwrap_err();

        assert!(matches!(err, EventError::PublishFailed { ref topic, .. } if topic == "orders"));
        assert!(producer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_partitions_in_range() {
        let producer = MemoryProducer::new(MemoryConfig {
            partitions: 4,
            ..Default::default()
        });
        for _ in 0..50 {
            let report = producer.send(&message("orders")).await.unwrap();
            assert!((0..4).contains(&report.partition));
        }
    }

    #[tokio::test]
    async fn test_close_semantics() {
        let producer = MemoryProducer::default();
        producer.close().await.unwrap();
        assert!(producer.is_closed());

        let err = producer.close().await.unwrap_err();
        assert!(matches!(err, EventError::TransportClosed(_)));

        let err = producer.send(&message("orders")).await.unwrap_err();
        assert!(matches!(err, EventError::TransportClosed(_)));
    }
}
