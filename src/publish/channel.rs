//! Buffered, non-blocking publisher backed by a background drain task.

use super::{EventPublisher, EventSink, OutboundMessage};
use crate::error::{Error, Result};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Publisher that queues messages and lets a spawned task deliver them.
///
/// `publish` uses `try_send`: a full buffer or a stopped drain task is
/// reported as `Error::PublishError` immediately, never by waiting.
/// Delivery failures inside the task are logged and the message dropped.
///
/// The drain task ends once every clone of the publisher is dropped and the
/// buffer is empty.
///
/// # Example
///
/// ```no_run
/// use aspect_kit::publish::{ChannelPublisher, EventPublisher, LogSink, OutboundMessage};
///
/// #[tokio::main]
/// async fn main() {
///     let (publisher, drain) = ChannelPublisher::spawn(LogSink, 1024).unwrap();
///     publisher
///         .publish(OutboundMessage::new("service_logs", serde_json::json!({"ok": true})))
///         .unwrap();
///
///     drop(publisher);
///     drain.await.unwrap();
/// }
/// ```
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<OutboundMessage>,
}

impl ChannelPublisher {
    /// Spawn the drain task on the current tokio runtime.
    ///
    /// A `buffer` of zero is raised to one.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when called outside a tokio runtime.
    pub fn spawn<S: EventSink>(sink: S, buffer: usize) -> Result<(Self, JoinHandle<()>)> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::ConfigError(format!("Publish channel needs a tokio runtime: {}", e))
        })?;
        let (sender, mut receiver) = mpsc::channel::<OutboundMessage>(buffer.max(1));

        let handle = runtime.spawn(async move {
            while let Some(message) = receiver.recv().await {
                let topic = message.topic.clone();
                match sink.send(message).await {
                    Ok(()) => debug!("✓ Delivered event to topic: {}", topic),
                    Err(e) => warn!("Failed to deliver event to topic {}: {}", topic, e),
                }
            }
            debug!("Publish channel closed, drain task exiting");
        });

        Ok((ChannelPublisher { sender }, handle))
    }

    /// Free buffer slots right now.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, message: OutboundMessage) -> Result<()> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(message) => Error::PublishError(format!(
                "publish buffer full, dropping event for topic {}",
                message.topic
            )),
            TrySendError::Closed(message) => Error::PublishError(format!(
                "publish channel closed, dropping event for topic {}",
                message.topic
            )),
        })
    }
}
