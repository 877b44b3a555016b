//! Kafka transport (feature `kafka`).
//!
//! Payloads are sent as JSON. The message key and headers are copied as-is,
//! so log consumers can partition by service name and filter on `type`.

use super::{EventSink, OutboundMessage};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;

/// Configuration for the Kafka producer.
#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Kafka bootstrap servers (comma-separated).
    pub bootstrap_servers: String,
    /// Client id reported to the brokers.
    pub client_id: Option<String>,
    /// How long `send` may wait for room in the producer queue.
    pub queue_timeout: Duration,
    /// Delivery deadline for a produced message (`message.timeout.ms`).
    pub message_timeout: Duration,
    /// Security protocol (PLAINTEXT, SSL, SASL_PLAINTEXT, SASL_SSL).
    pub security_protocol: Option<String>,
}

impl KafkaConfig {
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        KafkaConfig {
            bootstrap_servers: bootstrap_servers.into(),
            client_id: None,
            queue_timeout: Duration::from_secs(5),
            message_timeout: Duration::from_secs(5),
            security_protocol: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_queue_timeout(mut self, timeout: Duration) -> Self {
        self.queue_timeout = timeout;
        self
    }

    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }

    pub fn with_security_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.security_protocol = Some(protocol.into());
        self
    }

    fn build_producer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.bootstrap_servers);
        config.set(
            "message.timeout.ms",
            self.message_timeout.as_millis().to_string(),
        );

        if let Some(ref client_id) = self.client_id {
            config.set("client.id", client_id);
        }
        if let Some(ref protocol) = self.security_protocol {
            config.set("security.protocol", protocol);
        }
        config
    }
}

/// Kafka-backed [`EventSink`].
pub struct KafkaSink {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaSink {
    /// Create the producer. No broker round-trip happens here.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if librdkafka rejects the configuration.
    pub fn new(config: KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = config
            .build_producer_config()
            .create()
            .map_err(|e| Error::ConfigError(format!("Failed to create Kafka producer: {}", e)))?;

        info!(
            "Kafka producer created for bootstrap servers {}",
            config.bootstrap_servers
        );

        Ok(KafkaSink {
            producer,
            queue_timeout: config.queue_timeout,
        })
    }
}

impl EventSink for KafkaSink {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let payload = serde_json::to_vec(&message.payload)?;

            let mut headers = OwnedHeaders::new();
            for (name, value) in &message.headers {
                headers = headers.insert(Header {
                    key: name.as_str(),
                    value: Some(value.as_str()),
                });
            }

            let mut record = FutureRecord::to(&message.topic)
                .payload(&payload)
                .headers(headers);

            if let Some(ref key) = message.key {
                record = record.key(key);
            }

            self.producer
                .send(record, self.queue_timeout)
                .await
                .map_err(|(e, _)| Error::PublishError(format!("Failed to publish: {}", e)))?;

            debug!("✓ Kafka SEND topic={} key={:?}", message.topic, message.key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_config_defaults() {
        let config = KafkaConfig::new("localhost:9092").build_producer_config();

        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("message.timeout.ms"), Some("5000"));
        assert_eq!(config.get("client.id"), None);
        assert_eq!(config.get("security.protocol"), None);
    }

    #[test]
    fn test_producer_config_follows_settings() {
        let config = KafkaConfig::new("broker-1:9092,broker-2:9092")
            .with_client_id("orders-aspects")
            .with_security_protocol("SASL_SSL")
            .with_message_timeout(Duration::from_millis(1500))
            .build_producer_config();

        assert_eq!(
            config.get("bootstrap.servers"),
            Some("broker-1:9092,broker-2:9092")
        );
        assert_eq!(config.get("message.timeout.ms"), Some("1500"));
        assert_eq!(config.get("client.id"), Some("orders-aspects"));
        assert_eq!(config.get("security.protocol"), Some("SASL_SSL"));
    }
}
