//! Core event types for a3s-event-producer
//!
//! Field names follow the registered Avro definition (`schemas/tx_event.avsc`):
//! snake_case for the envelope fields, while each detail payload owns its own
//! naming.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A business transaction event
///
/// There is no compile-time link between this type and the schema
/// registered for a subject. Conformance is checked when the event is
/// encoded against a `SchemaHandle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEvent {
    /// Time the event occurred
    pub timestamp: DateTime<Utc>,

    /// Request identifier of the originating call
    pub req_uid: String,

    pub company_code: String,
    pub company_name: String,
    pub channel: String,
    pub version: String,
    pub product: String,

    /// Event classification
    pub event_code: String,
    pub event_name: String,
    pub event_status: String,

    /// Service that produced the event
    pub service_name: String,

    /// Category-specific payload
    pub transaction_detail: EventDetail,

    #[serde(default)]
    pub description: String,
}

impl TxEvent {
    /// Create an event stamped with the current time
    ///
    /// Classification fields start empty; fill them with the `with_*` builders.
    pub fn new(
        req_uid: impl Into<String>,
        service_name: impl Into<String>,
        detail: impl Into<EventDetail>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            req_uid: req_uid.into(),
            company_code: String::new(),
            company_name: String::new(),
            channel: String::new(),
            version: "1".to_string(),
            product: String::new(),
            event_code: String::new(),
            event_name: String::new(),
            event_status: String::new(),
            service_name: service_name.into(),
            transaction_detail: detail.into(),
            description: String::new(),
        }
    }

    pub fn with_company(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.company_code = code.into();
        self.company_name = name.into();
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set event code, name and status
    pub fn with_classification(
        mut self,
        code: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        self.event_code = code.into();
        self.event_name = name.into();
        self.event_status = status.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Detail payload, one variant per business-event category
///
/// Serialized without a tag: the wire carries only the variant's fields,
/// which is what the registered record schema describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDetail {
    /// Monetary transaction amounts
    Transaction(TransactionDetail),

    /// Category without a typed model yet
    Custom(serde_json::Map<String, serde_json::Value>),
}

impl EventDetail {
    /// Category name, used in logs
    pub fn category(&self) -> &'static str {
        match self {
            EventDetail::Transaction(_) => "transaction",
            EventDetail::Custom(_) => "custom",
        }
    }
}

impl From<TransactionDetail> for EventDetail {
    fn from(detail: TransactionDetail) -> Self {
        EventDetail::Transaction(detail)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for EventDetail {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        EventDetail::Custom(map)
    }
}

/// Amounts attached to a transaction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub tran_amount: f64,
    pub mer_fee_amt: f64,
    pub cus_fee_amt: f64,
}

/// How the producer picks a partition for an outbound message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionPolicy {
    /// Uniformly random over the topic's partitions; the key is not hashed
    #[default]
    Random,
}

/// A message ready to be handed to a producer
///
/// Built once per publish attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    topic: String,
    key: Option<String>,
    value: Bytes,
    partition_policy: PartitionPolicy,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, key: Option<String>, value: Bytes) -> Self {
        Self {
            topic: topic.into(),
            key,
            value,
            partition_policy: PartitionPolicy::Random,
        }
    }

    /// Keyed message with a fresh UUID key
    pub fn with_random_key(topic: impl Into<String>, value: Bytes) -> Self {
        Self::new(topic, Some(uuid::Uuid::new_v4().to_string()), value)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn partition_policy(&self) -> PartitionPolicy {
        self.partition_policy
    }
}

/// Broker acknowledgement for a single message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}
