//! In-process publishers and sinks (testing, local development).

use super::{EventPublisher, EventSink, OutboundMessage};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

/// Publisher that keeps every accepted message in memory.
///
/// Clones share the same message list. [`RecordingPublisher::failing`]
/// builds one that rejects everything, for exercising failure paths.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
    failing: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every call fails with `Error::PublishError`.
    pub fn failing() -> Self {
        RecordingPublisher {
            messages: Arc::default(),
            failing: true,
        }
    }

    /// Snapshot of accepted messages, oldest first.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.clear();
        }
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, message: OutboundMessage) -> Result<()> {
        if self.failing {
            return Err(Error::PublishError("transport unavailable".to_string()));
        }

        let mut guard = self
            .messages
            .lock()
            .map_err(|e| Error::PublishError(format!("recorder poisoned: {}", e)))?;
        guard.push(message);
        Ok(())
    }
}

impl EventSink for RecordingPublisher {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<()>> {
        let result = self.publish(message);
        Box::pin(async move { result })
    }
}

/// Sink that writes each message to the `log` facade at info level.
#[derive(Clone, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            info!(
                "EVENT topic={} key={} headers={:?} payload={}",
                message.topic,
                message.key.as_deref().unwrap_or("-"),
                message.headers,
                message.payload
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recording_publisher() {
        let publisher = RecordingPublisher::new();
        publisher
            .publish(OutboundMessage::new("logs", json!({"n": 1})))
            .expect("publish failed");
        publisher
            .publish(OutboundMessage::new("logs", json!({"n": 2})))
            .expect("publish failed");

        let messages = publisher.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].payload["n"], 2);

        publisher.clear();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_failing_publisher() {
        let publisher = RecordingPublisher::failing();
        let err = publisher
            .publish(OutboundMessage::new("logs", json!(null)))
            .unwrap_err();
        assert!(matches!(err, Error::PublishError(_)));
        assert!(publisher.is_empty());
    }

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        let _ = env_logger::builder().is_test(true).try_init();
        LogSink
            .send(OutboundMessage::new("logs", json!({"a": 1})).with_key("svc"))
            .await
            .expect("log sink failed");
    }
}
