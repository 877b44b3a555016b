//! Call wrappers.
//!
//! Each aspect decorates an operation passed in as a future or closure:
//!
//! | Aspect | Runs | Publishes |
//! |--------|------|-----------|
//! | [`CachedAspect`] | around | nothing (logs cache transitions) |
//! | [`HttpIncomeLogAspect`] | before | `INCOME` |
//! | [`HttpOutcomeLogAspect`] | after success | `OUTCOME` |
//! | [`DatasourceErrorAspect`] | after failure | `ERROR` |
//! | [`MetricAspect`] | around | `WARNING` / `SLOW_METHOD` when slow |
//!
//! Apart from a cache hit, no aspect changes what the wrapped call returns.
//! Failures on the event side (rendering, publishing, missing request
//! context) are logged and swallowed.

use crate::event::EventType;
use crate::publish::{EventPublisher, OutboundMessage};
use crate::settings::AspectSettings;
use serde::Serialize;
use std::sync::Arc;

pub mod cached;
pub mod datasource_error;
pub mod http_log;
pub mod metric;

pub use cached::CachedAspect;
pub use datasource_error::DatasourceErrorAspect;
pub use http_log::{HttpIncomeLogAspect, HttpOutcomeLogAspect};
pub use metric::MetricAspect;

/// Where and as whom the event-producing aspects publish.
#[derive(Clone)]
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
    topic: String,
    service_name: String,
}

/// Message framing for one event.
pub(crate) struct Framing {
    /// Route by service name.
    pub keyed: bool,
    /// Value of the `type` header, if any.
    pub type_header: Option<EventType>,
}

impl EventEmitter {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        topic: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        EventEmitter {
            publisher,
            topic: topic.into(),
            service_name: service_name.into(),
        }
    }

    pub fn from_settings(publisher: Arc<dyn EventPublisher>, settings: &AspectSettings) -> Self {
        Self::new(publisher, &settings.logging_topic, &settings.service_name)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Serialize and hand off one event. Never fails from the caller's view.
    pub(crate) fn emit<E: Serialize>(&self, event: &E, framing: Framing, what: &str) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to build {} payload: {}", what, e);
                return;
            }
        };

        let mut message = OutboundMessage::new(&self.topic, payload);
        if framing.keyed {
            message = message.with_key(&self.service_name);
        }
        if let Some(event_type) = framing.type_header {
            message = message.with_header("type", event_type.as_str());
        }

        match self.publisher.publish(message) {
            Ok(()) => debug!("Successfully sent {} to topic: {}", what, self.topic),
            Err(e) => warn!("Failed to send {} to topic {}: {}", what, self.topic, e),
        }
    }
}
