//! Error types for the aspect toolkit.
//!
//! None of these errors ever reach the caller of a wrapped operation: the
//! aspects recover from them locally. They surface only through the lower
//! level APIs (publishers, serialization helpers, settings loading).

use std::fmt;

/// Result type for aspect-side operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the aspect toolkit.
///
/// The wrapped call's own failure is never converted into this type; it is
/// handed back to the caller exactly as produced.
#[derive(Debug, Clone)]
pub enum Error {
    /// A value could not be rendered as JSON text.
    ///
    /// Common causes:
    /// - Map with non-string keys
    /// - Custom `Serialize` impl returned an error
    ///
    /// **Recovery:** aspects substitute a descriptive placeholder string.
    SerializationError(String),

    /// The outbound port or the transport rejected a message.
    ///
    /// Common causes:
    /// - Publish buffer is full
    /// - Background drain task has stopped
    /// - Broker unreachable
    ///
    /// **Recovery:** logged and dropped. Never retried.
    PublishError(String),

    /// No request context is available for the current task.
    ///
    /// **Recovery:** aspects substitute the `"N/A"` sentinel.
    ContextUnavailable(String),

    /// Settings could not be loaded or are invalid.
    ///
    /// **Recovery:** fix configuration and restart.
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::PublishError(msg) => write!(f, "Publish error: {}", msg),
            Error::ContextUnavailable(msg) => write!(f, "Context unavailable: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for Error {
    fn from(e: rdkafka::error::KafkaError) -> Self {
        Error::PublishError(format!("Kafka error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PublishError("buffer full".to_string());
        assert_eq!(err.to_string(), "Publish error: buffer full");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        use std::collections::HashMap;

        // Non-string map keys cannot be represented as JSON object keys.
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err: Error = serde_json::to_string(&map).unwrap_err().into();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}
