//! Aspect configuration.
//!
//! Values come from, in increasing precedence:
//! 1. built-in defaults,
//! 2. `config/aspects.{toml,yaml,json,...}` (optional),
//! 3. `config/aspects.local.*` (optional),
//! 4. environment variables prefixed `ASPECTS__`, e.g.
//!    `ASPECTS__CACHE_TTL_MS=30000`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Settings shared by all aspects.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AspectSettings {
    /// Topic every event is published to.
    pub logging_topic: String,
    /// Calls at or above this duration emit a `SLOW_METHOD` warning.
    pub metrics_threshold_ms: u64,
    /// Time-to-live of cached results.
    pub cache_ttl_ms: u64,
    /// Reported in every event and used as the message key.
    pub service_name: String,
    /// Slots in the non-blocking publish buffer.
    pub publish_buffer: usize,
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            logging_topic: "service_logs".to_string(),
            metrics_threshold_ms: 100,
            cache_ttl_ms: 60_000,
            service_name: "service".to_string(),
            publish_buffer: 1024,
        }
    }
}

impl AspectSettings {
    /// Load settings from the optional files and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if a source is malformed or a value
    /// fails validation.
    pub fn load() -> Result<Self> {
        Self::load_with(config::Environment::with_prefix("ASPECTS"))
    }

    fn load_with(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/aspects").required(false))
            .add_source(config::File::with_name("config/aspects.local").required(false))
            .add_source(environment.separator("__").try_parsing(true))
            .build()?;

        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no aspect can work with.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.logging_topic.trim().is_empty() {
            return Err(Error::ConfigError("logging_topic must not be empty".to_string()));
        }
        if self.service_name.trim().is_empty() {
            return Err(Error::ConfigError("service_name must not be empty".to_string()));
        }
        if self.publish_buffer == 0 {
            return Err(Error::ConfigError("publish_buffer must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn metrics_threshold(&self) -> Duration {
        Duration::from_millis(self.metrics_threshold_ms)
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn with_logging_topic(mut self, topic: impl Into<String>) -> Self {
        self.logging_topic = topic.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn with_metrics_threshold(mut self, threshold: Duration) -> Self {
        self.metrics_threshold_ms = threshold.as_millis() as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("ASPECTS").source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = AspectSettings::default();
        assert_eq!(settings.logging_topic, "service_logs");
        assert_eq!(settings.metrics_threshold(), Duration::from_millis(100));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.service_name, "service");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_without_sources_gives_defaults() {
        let settings = AspectSettings::load_with(env(&[])).expect("load failed");
        assert_eq!(settings, AspectSettings::default());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = AspectSettings::load_with(env(&[
            ("ASPECTS__CACHE_TTL_MS", "5000"),
            ("ASPECTS__SERVICE_NAME", "billing"),
        ]))
        .expect("load failed");

        assert_eq!(settings.cache_ttl_ms, 5000);
        assert_eq!(settings.service_name, "billing");
        assert_eq!(settings.logging_topic, "service_logs");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = AspectSettings::load_with(env(&[("ASPECTS__PUBLISH_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_builders() {
        let settings = AspectSettings::default()
            .with_service_name("orders")
            .with_logging_topic("orders_logs")
            .with_cache_ttl(Duration::from_millis(50))
            .with_metrics_threshold(Duration::from_millis(10));

        assert_eq!(settings.service_name, "orders");
        assert_eq!(settings.logging_topic, "orders_logs");
        assert_eq!(settings.cache_ttl_ms, 50);
        assert_eq!(settings.metrics_threshold_ms, 10);
    }
}
