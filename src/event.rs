//! Event payloads published by the logging and metric aspects.
//!
//! Every payload serializes to a flat JSON object with fixed camelCase keys;
//! downstream consumers match on these names, so renaming a field is a
//! breaking change.

use serde::Serialize;

/// Sentinel used when no request context is available.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel used when a request is in scope but its body was not captured.
pub const BODY_NOT_AVAILABLE: &str = "Body not available";

/// Direction of an HTTP log event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestType {
    Income,
    Outcome,
}

/// Severity tag carried in the `type` field and message header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Info,
    Warning,
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Info => "INFO",
            EventType::Warning => "WARNING",
            EventType::Error => "ERROR",
        }
    }
}

/// Current local time, ISO-8601 without offset.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

/// `INCOME` / `OUTCOME` record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpLogEvent {
    pub timestamp: String,
    pub method_signature: String,
    pub uri: String,
    pub parameters: String,
    pub body: String,
    pub service_name: String,
    pub request_type: RequestType,
}

/// `ERROR` record for a failed datasource call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub timestamp: String,
    pub method_signature: String,
    pub stack_trace: String,
    pub exception_message: String,
    pub method_parameters: String,
    pub service_name: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

/// `WARNING` / `SLOW_METHOD` record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowMethodEvent {
    pub service: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub event: &'static str,
    pub method: String,
    pub elapsed_ms: u64,
    pub params: String,
}

impl SlowMethodEvent {
    pub const EVENT: &'static str = "SLOW_METHOD";

    pub fn new(service: String, method: String, elapsed_ms: u64, params: String) -> Self {
        SlowMethodEvent {
            service,
            event_type: EventType::Warning,
            event: Self::EVENT,
            method,
            elapsed_ms,
            params,
        }
    }
}
