//! Error types for a3s-event-producer

use thiserror::Error;

/// Errors that can occur while resolving schemas, encoding, or publishing
#[derive(Debug, Error)]
pub enum EventError {
    /// Schema registry could not be reached or answered with a server error
    #[error("Schema registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Registry refused the schema definition (malformed or incompatible)
    #[error("Schema rejected for subject '{subject}': {reason}")]
    SchemaRejected {
        subject: String,
        reason: String,
    },

    /// Subject or schema does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Event data does not satisfy the schema's fields or types
    #[error("Event does not conform to schema {schema_id}: {reason}")]
    EncodingMismatch {
        schema_id: u32,
        reason: String,
    },

    /// Codec failed to produce the binary form of a native value
    #[error("Binary encoding failed for schema {schema_id}: {reason}")]
    BinaryEncodingError {
        schema_id: u32,
        reason: String,
    },

    /// Broker did not accept the message
    #[error("Failed to publish to topic '{topic}': {reason}")]
    PublishFailed {
        topic: String,
        reason: String,
    },

    /// Producer transport was already released
    #[error("Producer transport closed: {0}")]
    TransportClosed(String),

    /// Producer construction or broker connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event could not be rendered to its textual form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventError {
    /// Returns true if the failure is transient and the operation may succeed on retry.
    ///
    /// Nothing in this crate retries; the classification is for callers
    /// that wrap the publisher in their own retry loop.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RegistryUnavailable(_) | Self::PublishFailed { .. } | Self::Timeout(_)
        )
    }

    /// Pipeline stage the error belongs to, used for attributable exit messages
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Connection(_) => "producer setup",
            Self::RegistryUnavailable(_) | Self::NotFound(_) => "schema resolution",
            Self::SchemaRejected { .. } => "schema creation",
            Self::EncodingMismatch { .. }
            | Self::BinaryEncodingError { .. }
            | Self::Serialization(_) => "encoding",
            Self::PublishFailed { .. } | Self::TransportClosed(_) | Self::Timeout(_) => "publish",
        }
    }
}

/// Result type alias for producer operations
pub type Result<T> = std::result::Result<T, EventError>;
