//! Publish pipeline: resolve schema, encode, send
//!
//! `EventPublisher` composes a `SchemaResolver`, an `EventProducer` and the
//! `EnvelopeEncoder`. It processes one event at a time and stops at the
//! first failure; retries are left to whoever drives it.

use crate::config::PublisherConfig;
use crate::envelope::EnvelopeEncoder;
use crate::error::Result;
use crate::provider::kafka::KafkaProducer;
use crate::provider::EventProducer;
use crate::schema::http::HttpSchemaRegistry;
use crate::schema::{subject_name, SchemaFormat, SchemaHandle, SchemaResolver, SchemaSource};
use crate::types::{DeliveryReport, OutboundMessage};
use serde::Serialize;

/// Subject resolution settings
#[derive(Debug, Clone)]
pub struct ResolvePolicy {
    /// Subject base name (usually the topic)
    pub subject: String,

    /// Delete the subject permanently before lookup
    pub delete_existing: bool,

    /// Resolve the key schema instead of the value schema
    pub is_key: bool,

    pub format: SchemaFormat,
}

impl ResolvePolicy {
    /// Value-schema policy for a topic without deletion
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            subject: topic.into(),
            delete_existing: false,
            is_key: false,
            format: SchemaFormat::Avro,
        }
    }

    pub fn delete_existing(mut self, delete: bool) -> Self {
        self.delete_existing = delete;
        self
    }
}

/// Result of a successful publish
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    /// Key the message was sent with
    pub key: String,

    /// Schema id written into the envelope header
    pub schema_id: u32,

    /// Broker acknowledgement
    pub delivery: DeliveryReport,
}

/// Schema-aware event publisher
pub struct EventPublisher {
    resolver: Box<dyn SchemaResolver>,
    producer: Box<dyn EventProducer>,
    encoder: EnvelopeEncoder,
    topic: String,
    policy: ResolvePolicy,
}

impl EventPublisher {
    /// Create a publisher for a topic
    pub fn new(
        resolver: impl SchemaResolver + 'static,
        producer: impl EventProducer + 'static,
        topic: impl Into<String>,
        policy: ResolvePolicy,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            producer: Box::new(producer),
            encoder: EnvelopeEncoder::new(),
            topic: topic.into(),
            policy,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get the producer name
    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    /// Find the schema for the subject, registering it if absent
    ///
    /// With `delete_existing` the subject is first deleted; a failed delete
    /// is logged and resolution continues. `source` is only read when the
    /// registry has no schema for the subject.
    pub async fn resolve_schema(&self, source: &SchemaSource) -> Result<SchemaHandle> {
        let policy = &self.policy;

        if policy.delete_existing {
            let subject = subject_name(&policy.subject, policy.is_key);
            if let Err(e) = self.resolver.delete_subject(&subject, true).await {
                tracing::warn!(subject = %subject, error = %e, "Subject delete failed, continuing");
            }
        }

        let handle = match self
            .resolver
            .get_latest_schema(&policy.subject, policy.is_key)
            .await?
        {
            Some(handle) => handle,
            None => {
                let definition = source.load().await?;
                self.resolver
                    .create_schema(&policy.subject, &definition, policy.format, policy.is_key)
                    .await?
            }
        };

        tracing::info!(
            resolver = self.resolver.name(),
            subject = handle.subject(),
            schema_id = handle.id(),
            version = handle.version(),
            "Schema resolved"
        );

        Ok(handle)
    }

    /// Encode an event and send it
    ///
    /// The producer is only called once the envelope is complete.
    pub async fn publish<E>(&self, schema: &SchemaHandle, event: &E) -> Result<PublishReceipt>
    where
        E: Serialize + Sync + ?Sized,
    {
        let envelope = self.encoder.encode(schema, event)?;
        let message = OutboundMessage::with_random_key(&self.topic, envelope);
        let key = message.key().unwrap_or_default().to_string();

        let delivery = self.producer.send(&message).await?;

        Ok(PublishReceipt {
            key,
            schema_id: schema.id(),
            delivery,
        })
    }

    /// Resolve the schema and publish one event
    pub async fn publish_event<E>(&self, source: &SchemaSource, event: &E) -> Result<PublishReceipt>
    where
        E: Serialize + Sync + ?Sized,
    {
        let schema = self.resolve_schema(source).await?;
        self.publish(&schema, event).await
    }

    /// Release the producer
    pub async fn close(&self) -> Result<()> {
        self.producer.close().await
    }
}

/// Publish a single event using the registry and brokers named in `config`
pub async fn run<E>(config: &PublisherConfig, event: &E) -> Result<PublishReceipt>
where
    E: Serialize + Sync + ?Sized,
{
    config.validate()?;

    let resolver = HttpSchemaRegistry::new(config.registry())?;
    let producer = KafkaProducer::connect(config.kafka()).await?;

    let publisher = EventPublisher::new(
        resolver,
        producer,
        config.topic.clone(),
        ResolvePolicy::for_topic(config.topic.clone())
            .delete_existing(config.delete_existing_schema),
    );

    let source = SchemaSource::File(config.schema_file_path.clone());
    publish_once(publisher, &source, event).await
}

/// Publish one event, then close the publisher
///
/// The producer is closed whether or not publishing succeeded. An error
/// from the pipeline takes precedence over an error from closing.
pub async fn publish_once<E>(
    publisher: EventPublisher,
    source: &SchemaSource,
    event: &E,
) -> Result<PublishReceipt>
where
    E: Serialize + Sync + ?Sized,
{
    let outcome = publisher.publish_event(source, event).await;

    if let Err(e) = publisher.close().await {
        tracing::warn!(error = %e, "Failed to close producer");
        if outcome.is_ok() {
            return Err(e);
        }
    }

    outcome
}
