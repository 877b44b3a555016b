//! One-stop construction of every aspect from shared settings.
//!
//! Wraps the settings in `Arc` and the aspects in a cloneable bundle, so a
//! single value can be stored in application state and handed to handlers.

use crate::aspect::{
    CachedAspect, DatasourceErrorAspect, EventEmitter, HttpIncomeLogAspect, HttpOutcomeLogAspect,
    MetricAspect,
};
use crate::error::Result;
use crate::publish::{ChannelPublisher, EventPublisher, EventSink};
use crate::settings::AspectSettings;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// All aspects configured from one [`AspectSettings`] and one publisher.
///
/// # Example
///
/// ```ignore
/// use aspect_kit::{AspectSettings, Aspects, publish::LogSink};
///
/// let (aspects, _drain) = Aspects::with_sink(AspectSettings::load()?, LogSink)?;
///
/// // In your web service struct
/// pub struct AccountService {
///     aspects: Aspects,
///     accounts: CachedAspect<Account>,
/// }
///
/// let accounts = aspects.cached::<Account>();
/// ```
#[derive(Clone)]
pub struct Aspects {
    settings: Arc<AspectSettings>,
    emitter: EventEmitter,
    http_income: HttpIncomeLogAspect,
    http_outcome: HttpOutcomeLogAspect,
    datasource_error: DatasourceErrorAspect,
    metric: MetricAspect,
}

impl Aspects {
    /// Build every aspect around an existing publisher.
    pub fn new(settings: AspectSettings, publisher: Arc<dyn EventPublisher>) -> Self {
        let emitter = EventEmitter::from_settings(publisher, &settings);

        Aspects {
            http_income: HttpIncomeLogAspect::new(emitter.clone()),
            http_outcome: HttpOutcomeLogAspect::new(emitter.clone()),
            datasource_error: DatasourceErrorAspect::new(emitter.clone()),
            metric: MetricAspect::from_settings(emitter.clone(), &settings),
            emitter,
            settings: Arc::new(settings),
        }
    }

    /// Validate `settings`, start a buffered publisher draining into `sink`
    /// and build every aspect on top of it.
    ///
    /// The returned handle finishes once every clone of the bundle is dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `settings` fail validation or no
    /// tokio runtime is running.
    pub fn with_sink<S: EventSink>(
        settings: AspectSettings,
        sink: S,
    ) -> Result<(Self, JoinHandle<()>)> {
        settings.validate()?;
        let (publisher, drain) = ChannelPublisher::spawn(sink, settings.publish_buffer)?;
        info!(
            "Aspects ready: service={} topic={} buffer={}",
            settings.service_name, settings.logging_topic, settings.publish_buffer
        );
        Ok((Self::new(settings, Arc::new(publisher)), drain))
    }

    pub fn settings(&self) -> &AspectSettings {
        &self.settings
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// A new cache-on-call aspect with the configured TTL.
    ///
    /// Every call creates an independent cache; keep the result to share it.
    pub fn cached<V: Clone + Send + Sync>(&self) -> CachedAspect<V> {
        CachedAspect::from_settings(&self.settings)
    }

    pub fn http_income(&self) -> &HttpIncomeLogAspect {
        &self.http_income
    }

    pub fn http_outcome(&self) -> &HttpOutcomeLogAspect {
        &self.http_outcome
    }

    pub fn datasource_error(&self) -> &DatasourceErrorAspect {
        &self.datasource_error
    }

    pub fn metric(&self) -> &MetricAspect {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joinpoint::JoinPoint;
    use crate::publish::RecordingPublisher;
    use std::time::Duration;

    #[test]
    fn test_aspects_follow_settings() {
        let settings = AspectSettings::default()
            .with_service_name("orders")
            .with_logging_topic("orders_logs")
            .with_metrics_threshold(Duration::from_millis(250))
            .with_cache_ttl(Duration::from_secs(5));
        let aspects = Aspects::new(settings, Arc::new(RecordingPublisher::new()));

        assert_eq!(aspects.emitter().service_name(), "orders");
        assert_eq!(aspects.emitter().topic(), "orders_logs");
        assert_eq!(aspects.metric().threshold(), Duration::from_millis(250));
        assert_eq!(
            aspects.cached::<String>().cache().ttl(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_aspects_clone_shares_settings() {
        let aspects = Aspects::new(
            AspectSettings::default(),
            Arc::new(RecordingPublisher::new()),
        );
        let clone = aspects.clone();
        assert!(Arc::ptr_eq(&aspects.settings, &clone.settings));
    }

    #[tokio::test]
    async fn test_with_sink_delivers_through_channel() {
        let sink = RecordingPublisher::new();
        let (aspects, drain) =
            Aspects::with_sink(AspectSettings::default(), sink.clone()).expect("valid settings");

        aspects.http_income().log_income(&JoinPoint::new("index()"));

        drop(aspects);
        drain.await.expect("drain task panicked");

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.messages()[0].payload["requestType"], "INCOME");
    }

    #[tokio::test]
    async fn test_with_sink_rejects_invalid_settings() {
        let settings = AspectSettings {
            publish_buffer: 0,
            ..AspectSettings::default()
        };
        assert!(Aspects::with_sink(settings, RecordingPublisher::new()).is_err());
    }

    #[test]
    fn test_with_sink_outside_runtime_is_an_error() {
        let result = Aspects::with_sink(AspectSettings::default(), RecordingPublisher::new());
        assert!(matches!(result, Err(crate::error::Error::ConfigError(_))));
    }
}
