//! # a3s-event-producer
//!
//! Schema-registry aware Avro event producer for Kafka in the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-event-producer` resolves (or registers) a writer schema in a schema
//! registry, encodes business events against it into framed Avro envelopes,
//! and publishes them to Kafka with all-replica acknowledgement.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_event_producer::{
//!     EventPublisher, MemoryProducer, MemorySchemaRegistry, ResolvePolicy, SchemaSource,
//! };
//!
//! # async fn example() -> a3s_event_producer::Result<()> {
//! let publisher = EventPublisher::new(
//!     MemorySchemaRegistry::new(),
//!     MemoryProducer::default(),
//!     "Orders",
//!     ResolvePolicy::for_topic("Orders"),
//! );
//!
//! let source = SchemaSource::Inline(
//!     r#"{"type":"record","name":"Order","fields":[
//!         {"name":"id","type":"string"},{"name":"name","type":"string"}]}"#
//!         .to_string(),
//! );
//!
//! let receipt = publisher
//!     .publish_event(&source, &serde_json::json!({"id": "4324", "name": "ABC"}))
//!     .await?;
//! println!("Published with schema {} at offset {}", receipt.schema_id, receipt.delivery.offset);
//! publisher.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Wire format
//!
//! Every message value is `[0x00][schema id, 4 bytes big-endian][Avro datum]`.
//!
//! ## Architecture
//!
//! - **SchemaResolver** trait: registry lookup, registration and deletion
//! - **EnvelopeEncoder**: JSON → native Avro → binary, plus framing
//! - **EventProducer** trait: keyed sends with all-replica acks
//! - **EventPublisher**: the resolve → encode → publish pipeline

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod provider;
pub mod publisher;
pub mod schema;
pub mod types;

// Re-export core types
pub use codec::AvroCodec;
pub use config::PublisherConfig;
pub use envelope::{decode_envelope, EnvelopeEncoder, HEADER_LEN, MAGIC_BYTE};
pub use error::{EventError, Result};
pub use provider::EventProducer;
pub use publisher::{publish_once, run, EventPublisher, PublishReceipt, ResolvePolicy};
pub use schema::{subject_name, SchemaFormat, SchemaHandle, SchemaResolver, SchemaSource};
pub use types::{
    DeliveryReport, EventDetail, OutboundMessage, PartitionPolicy, TransactionDetail, TxEvent,
};

// Re-export backends for convenience
pub use provider::kafka::{KafkaClient, KafkaConfig, KafkaProducer};
pub use provider::memory::{MemoryConfig, MemoryProducer};
pub use schema::http::{HttpSchemaRegistry, RegistryConfig};
pub use schema::memory::MemorySchemaRegistry;
