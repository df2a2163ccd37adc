//! Kafka producer configuration

use crate::error::{EventError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the Kafka producer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConfig {
    /// Bootstrap brokers as `host:port`
    pub brokers: Vec<String>,

    /// Time allowed for the initial broker connection (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Time allowed for a single send, including the all-replica ack (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl KafkaConfig {
    /// Check broker addresses and timeouts
    pub fn validate(&self) -> Result<()> {
        if self.brokers.is_empty() {
            return Err(EventError::Config(
                "At least one broker address is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .brokers
            .iter()
            .find(|b| b.rsplit_once(':').map_or(true, |(host, port)| {
                host.is_empty() || port.parse::<u16>().is_err()
            }))
        {
            return Err(EventError::Config(format!(
                "Broker address '{}' is not host:port",
                bad
            )));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(EventError::Config(
                "Kafka timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KafkaConfig::default();
        assert_eq!(config.brokers, vec!["localhost:9092"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_brokers_rejected() {
        let config = KafkaConfig {
            brokers: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_broker_without_port_rejected() {
        for bad in ["localhost", "localhost:", ":9092", "localhost:http"] {
            let config = KafkaConfig {
                brokers: vec!["kafka-1:9092".to_string(), bad.to_string()],
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(bad), "{}", err);
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = KafkaConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults() {
        let config: KafkaConfig = serde_json::from_str(r#"{"brokers": ["k:9092"]}"#).unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
