//! Outbound event port and transport implementations.
//!
//! Publishing is split in two layers:
//!
//! - [`EventPublisher`] is what aspects call. It is synchronous and must
//!   never block: implementations hand the message off and return.
//! - [`EventSink`] is the transport (Kafka, a log line, an in-memory list).
//!   It is async and may be slow or fail; [`ChannelPublisher`] bridges the
//!   two with a bounded buffer drained by a background task.

use crate::error::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod channel;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;

pub use channel::ChannelPublisher;
#[cfg(feature = "kafka")]
pub use kafka::{KafkaConfig, KafkaSink};
pub use memory::{LogSink, RecordingPublisher};

/// A message bound for a topic.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub topic: String,
    /// Routing key. `None` lets the transport pick a partition.
    pub key: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub payload: Value,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        OutboundMessage {
            topic: topic.into(),
            key: None,
            headers: BTreeMap::new(),
            payload,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// One-way outbound port used by the aspects.
///
/// **IMPORTANT:** `publish` is called on the business call path. It must
/// return promptly and must not wait for broker acknowledgment.
pub trait EventPublisher: Send + Sync {
    /// Hand a message off for delivery.
    ///
    /// # Errors
    ///
    /// Returns `Error::PublishError` if the message could not be accepted.
    fn publish(&self, message: OutboundMessage) -> Result<()>;
}

impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    fn publish(&self, message: OutboundMessage) -> Result<()> {
        (**self).publish(message)
    }
}

/// Message transport.
///
/// Abstracts the broker client, allowing swappable transports.
/// Implementations: Kafka (feature `kafka`), log output, in-memory.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the transport rejects the message or is unreachable.
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<()>>;
}
