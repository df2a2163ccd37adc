//! Publisher configuration
//!
//! Everything the pipeline needs is passed in explicitly through
//! `PublisherConfig`. It can be loaded from an HCL file and then
//! overridden field by field (the binary does this with CLI flags).
//!
//! ```hcl
//! broker_addresses       = ["kafka-1:9092", "kafka-2:9092"]
//! topic                  = "TxEvent"
//! registry_url           = "http://schema-registry:8081"
//! schema_file_path       = "schemas/tx_event.avsc"
//! delete_existing_schema = false
//! ```

use crate::error::{EventError, Result};
use crate::provider::kafka::KafkaConfig;
use crate::schema::http::RegistryConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for a publish run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Bootstrap brokers as `host:port`
    pub broker_addresses: Vec<String>,

    /// Destination topic; also the subject base name in the registry
    pub topic: String,

    /// Schema registry base URL
    pub registry_url: String,

    pub registry_username: Option<String>,
    pub registry_password: Option<String>,

    /// Avro definition registered when the subject has no schema
    pub schema_file_path: PathBuf,

    /// Delete the subject before resolving
    ///
    /// Only meant for rebuildable environments: it discards every
    /// registered version instead of going through compatibility checks.
    pub delete_existing_schema: bool,

    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            broker_addresses: vec!["localhost:9092".to_string()],
            topic: "TxEvent".to_string(),
            registry_url: "http://localhost:8081".to_string(),
            registry_username: None,
            registry_password: None,
            schema_file_path: PathBuf::from("schemas/tx_event.avsc"),
            delete_existing_schema: false,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl PublisherConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| {
            EventError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let cfg: PublisherConfig = hcl::from_str(&src).map_err(|e| {
            EventError::Config(format!("parse error in {}: {}", path.display(), e))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(EventError::Config("topic cannot be empty".to_string()));
        }
        if !(self.registry_url.starts_with("http://") || self.registry_url.starts_with("https://"))
        {
            return Err(EventError::Config(format!(
                "registry_url must be an http(s) URL, got '{}'",
                self.registry_url
            )));
        }
        if self.registry_password.is_some() && self.registry_username.is_none() {
            return Err(EventError::Config(
                "registry_password set without registry_username".to_string(),
            ));
        }
        self.kafka().validate()
    }

    /// Producer settings derived from this configuration
    pub fn kafka(&self) -> KafkaConfig {
        KafkaConfig {
            brokers: self.broker_addresses.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Registry settings derived from this configuration
    pub fn registry(&self) -> RegistryConfig {
        RegistryConfig {
            url: self.registry_url.clone(),
            username: self.registry_username.clone(),
            password: self.registry_password.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}
