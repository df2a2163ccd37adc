//! Schema resolution against a schema registry
//!
//! A `SchemaResolver` looks up, registers and deletes schemas under a
//! subject and hands back `SchemaHandle`s carrying the registry id and a
//! codec for the definition. Two resolvers ship with the crate:
//!
//! - **http**: Confluent-compatible REST registry
//! - **memory**: in-process registry for tests and local runs

use crate::codec::AvroCodec;
use crate::error::{EventError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod http;
pub mod memory;

/// Schema format discriminator sent to the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaFormat {
    /// Row-oriented Avro binary
    #[default]
    Avro,
}

impl SchemaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaFormat::Avro => "AVRO",
        }
    }
}

/// Build the registry subject for a topic (topic-name strategy)
///
/// `orders` becomes `orders-value`, or `orders-key` for key schemas.
pub fn subject_name(base: &str, is_key: bool) -> String {
    if is_key {
        format!("{}-key", base)
    } else {
        format!("{}-value", base)
    }
}

/// A registered schema version with its codec
///
/// Handles are immutable and are fetched fresh on every resolution.
#[derive(Debug, Clone)]
pub struct SchemaHandle {
    id: u32,
    subject: String,
    version: u32,
    definition: String,
    format: SchemaFormat,
    codec: AvroCodec,
}

impl SchemaHandle {
    /// Build a handle from registry data
    ///
    /// Fails with `SchemaRejected` when the definition does not parse,
    /// since such a handle could never encode anything.
    pub fn new(
        id: u32,
        subject: impl Into<String>,
        version: u32,
        definition: impl Into<String>,
        format: SchemaFormat,
    ) -> Result<Self> {
        let subject = subject.into();
        let definition = definition.into();
        let codec = AvroCodec::parse(&definition).map_err(|e| EventError::SchemaRejected {
            subject: subject.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id,
            subject,
            version,
            definition,
            format,
            codec,
        })
    }

    /// Registry-assigned schema id (written into every envelope)
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Version of this schema within its subject
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Schema definition text as stored by the registry
    pub fn schema(&self) -> &str {
        &self.definition
    }

    pub fn format(&self) -> SchemaFormat {
        self.format
    }

    pub fn codec(&self) -> &AvroCodec {
        &self.codec
    }

    /// Decode a binary payload (envelope header already stripped)
    pub fn decode(&self, payload: &[u8]) -> Result<apache_avro::types::Value> {
        self.codec
            .native_from_binary(payload)
            .map_err(|reason| EventError::EncodingMismatch {
                schema_id: self.id,
                reason,
            })
    }
}

/// Where a schema definition comes from when one has to be registered
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Read from a file (e.g. an `.avsc`) at registration time
    File(PathBuf),
    /// Definition text held in memory
    Inline(String),
}

impl SchemaSource {
    /// Load the definition text
    ///
    /// Files are read on demand so that nothing is touched when the
    /// registry already holds a schema for the subject.
    pub async fn load(&self) -> Result<String> {
        match self {
            SchemaSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                EventError::Config(format!(
                    "Failed to read schema file {}: {}",
                    path.display(),
                    e
                ))
            }),
            SchemaSource::Inline(text) => Ok(text.clone()),
        }
    }
}

/// Core trait for schema registries
///
/// Implementations handle the transport-specific details of talking to a
/// registry. `get_latest_schema` and `create_schema` take the subject base
/// name (usually the topic) and derive the subject with `subject_name`;
/// `delete_subject` takes the full subject.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Delete a subject and its versions
    ///
    /// `permanent` also removes the soft-deleted versions where the
    /// registry distinguishes the two.
    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()>;

    /// Fetch the latest schema registered for a subject
    ///
    /// Returns `Ok(None)` when the subject has no schema yet.
    async fn get_latest_schema(&self, subject_base: &str, is_key: bool)
        -> Result<Option<SchemaHandle>>;

    /// Register a schema definition as a new version of the subject
    ///
    /// The definition is forwarded as-is.
    async fn create_schema(
        &self,
        subject_base: &str,
        definition: &str,
        format: SchemaFormat,
        is_key: bool,
    ) -> Result<SchemaHandle>;

    /// Resolver name (e.g., "http", "memory")
    fn name(&self) -> &str;
}

#[async_trait]
impl<R: SchemaResolver + ?Sized> SchemaResolver for std::sync::Arc<R> {
    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()> {
        (**self).delete_subject(subject, permanent).await
    }

    async fn get_latest_schema(
        &self,
        subject_base: &str,
        is_key: bool,
    ) -> Result<Option<SchemaHandle>> {
        (**self).get_latest_schema(subject_base, is_key).await
    }

    async fn create_schema(
        &self,
        subject_base: &str,
        definition: &str,
        format: SchemaFormat,
        is_key: bool,
    ) -> Result<SchemaHandle> {
        (**self)
            .create_schema(subject_base, definition, format, is_key)
            .await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
