//! HTTP request/response logging aspects.

use super::{EventEmitter, Framing};
use crate::context::{self, RequestInfo};
use crate::event::{
    timestamp_now, EventType, HttpLogEvent, RequestType, BODY_NOT_AVAILABLE, NOT_AVAILABLE,
};
use crate::joinpoint::JoinPoint;
use crate::serialization::render_response;
use serde::Serialize;
use std::future::Future;

const HTTP_FRAMING: Framing = Framing {
    keyed: true,
    type_header: Some(EventType::Info),
};

fn request_in_scope() -> Option<RequestInfo> {
    match context::current_request() {
        Ok(request) => Some(request),
        Err(e) => {
            debug!("No HTTP request context available: {}", e);
            None
        }
    }
}

fn request_uri(request: Option<&RequestInfo>) -> String {
    request.map_or(NOT_AVAILABLE, |r| r.uri.as_str()).to_string()
}

/// Publishes an `INCOME` event before the handler runs.
#[derive(Clone)]
pub struct HttpIncomeLogAspect {
    emitter: EventEmitter,
}

impl HttpIncomeLogAspect {
    pub fn new(emitter: EventEmitter) -> Self {
        HttpIncomeLogAspect { emitter }
    }

    /// Publish the `INCOME` event for `join_point`.
    pub fn log_income(&self, join_point: &JoinPoint) {
        info!("HTTP_INCOME start method={}", join_point.short_signature());

        let request = request_in_scope();
        let uri = request_uri(request.as_ref());
        let body = match &request {
            Some(r) => r.body.as_deref().unwrap_or(BODY_NOT_AVAILABLE),
            None => NOT_AVAILABLE,
        };

        let event = HttpLogEvent {
            timestamp: timestamp_now(),
            method_signature: join_point.signature().to_string(),
            uri: uri.clone(),
            parameters: join_point.parameters_text(),
            body: body.to_string(),
            service_name: self.emitter.service_name().to_string(),
            request_type: RequestType::Income,
        };
        self.emitter.emit(&event, HTTP_FRAMING, "HTTP income log");

        info!(
            "HTTP_INCOME done method={} uri={}",
            join_point.signature(),
            uri
        );
    }

    /// Log, then run the handler. The handler's output is returned untouched.
    pub async fn around<Fut: Future>(&self, join_point: &JoinPoint, handler: Fut) -> Fut::Output {
        self.log_income(join_point);
        handler.await
    }
}

/// Publishes an `OUTCOME` event after the handler returns successfully.
#[derive(Clone)]
pub struct HttpOutcomeLogAspect {
    emitter: EventEmitter,
}

impl HttpOutcomeLogAspect {
    pub fn new(emitter: EventEmitter) -> Self {
        HttpOutcomeLogAspect { emitter }
    }

    /// Publish the `OUTCOME` event for `join_point` and its `result`.
    pub fn log_outcome<T: Serialize + ?Sized>(&self, join_point: &JoinPoint, result: &T) {
        info!("HTTP_OUTCOME start method={}", join_point.short_signature());

        let request = request_in_scope();
        let uri = request_uri(request.as_ref());

        let event = HttpLogEvent {
            timestamp: timestamp_now(),
            method_signature: join_point.signature().to_string(),
            uri: uri.clone(),
            parameters: join_point.parameters_text(),
            body: render_response(result),
            service_name: self.emitter.service_name().to_string(),
            request_type: RequestType::Outcome,
        };
        self.emitter.emit(&event, HTTP_FRAMING, "HTTP outcome log");

        info!(
            "HTTP_OUTCOME done method={} uri={}",
            join_point.signature(),
            uri
        );
    }

    /// Run the handler and log its value if it succeeded.
    ///
    /// Failures are returned untouched and publish nothing.
    pub async fn around<T, E, Fut>(&self, join_point: &JoinPoint, handler: Fut) -> Result<T, E>
    where
        T: Serialize,
        Fut: Future<Output = Result<T, E>>,
    {
        let result = handler.await;
        if let Ok(value) = &result {
            self.log_outcome(join_point, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_request;
    use crate::publish::RecordingPublisher;
    use serde_json::Value;
    use std::sync::Arc;

    fn emitter(recorder: &RecordingPublisher) -> EventEmitter {
        EventEmitter::new(Arc::new(recorder.clone()), "service_logs", "users")
    }

    #[tokio::test]
    async fn test_income_inside_request_scope() {
        let recorder = RecordingPublisher::new();
        let aspect = HttpIncomeLogAspect::new(emitter(&recorder));
        let jp = JoinPoint::new("UserController::create(body: NewUser)").arg("alice");

        let request = RequestInfo::new("/users").with_body(r#"{"name":"alice"}"#);
        let status = with_request(request, aspect.around(&jp, async { 201 })).await;
        assert_eq!(status, 201);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.topic, "service_logs");
        assert_eq!(message.key.as_deref(), Some("users"));
        assert_eq!(message.headers.get("type").map(String::as_str), Some("INFO"));

        let payload = &message.payload;
        assert_eq!(payload["requestType"], "INCOME");
        assert_eq!(payload["uri"], "/users");
        assert_eq!(payload["body"], r#"{"name":"alice"}"#);
        assert_eq!(payload["parameters"], r#"["alice"]"#);
        assert_eq!(payload["serviceName"], "users");
        assert_eq!(
            payload["methodSignature"],
            "UserController::create(body: NewUser)"
        );
        assert!(payload["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_income_without_request_uses_sentinels() {
        let recorder = RecordingPublisher::new();
        let aspect = HttpIncomeLogAspect::new(emitter(&recorder));

        aspect.log_income(&JoinPoint::new("job::run()"));

        let payload = &recorder.messages()[0].payload;
        assert_eq!(payload["uri"], "N/A");
        assert_eq!(payload["body"], "N/A");
        assert_eq!(payload["parameters"], "[]");
    }

    #[tokio::test]
    async fn test_income_without_captured_body() {
        let recorder = RecordingPublisher::new();
        let aspect = HttpIncomeLogAspect::new(emitter(&recorder));

        with_request(RequestInfo::new("/ping"), async {
            aspect.log_income(&JoinPoint::new("ping()"));
        })
        .await;

        let payload = &recorder.messages()[0].payload;
        assert_eq!(payload["uri"], "/ping");
        assert_eq!(payload["body"], "Body not available");
    }

    #[tokio::test]
    async fn test_outcome_logs_success_only() {
        let recorder = RecordingPublisher::new();
        let aspect = HttpOutcomeLogAspect::new(emitter(&recorder));
        let jp = JoinPoint::new("UserController::get(id: i64)").arg(7);

        let ok: Result<Value, String> = aspect
            .around(&jp, async { Ok(serde_json::json!({"id": 7})) })
            .await;
        assert!(ok.is_ok());

        let err: Result<Value, String> = aspect.around(&jp, async { Err("404".to_string()) }).await;
        assert_eq!(err.unwrap_err(), "404");

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        let payload = &messages[0].payload;
        assert_eq!(payload["requestType"], "OUTCOME");
        assert_eq!(payload["body"], r#"{"id":7}"#);
        assert_eq!(payload["parameters"], "[7]");
        assert_eq!(payload["uri"], "N/A");
    }

    #[tokio::test]
    async fn test_outcome_null_result() {
        let recorder = RecordingPublisher::new();
        let aspect = HttpOutcomeLogAspect::new(emitter(&recorder));

        aspect.log_outcome(&JoinPoint::new("delete()"), &());

        assert_eq!(recorder.messages()[0].payload["body"], "null");
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_affect_handler() {
        let emitter = EventEmitter::new(Arc::new(RecordingPublisher::failing()), "logs", "users");
        let income = HttpIncomeLogAspect::new(emitter.clone());
        let outcome = HttpOutcomeLogAspect::new(emitter);
        let jp = JoinPoint::new("handler()");

        let value = income.around(&jp, async { "hello" }).await;
        assert_eq!(value, "hello");

        let result: Result<&str, ()> = outcome.around(&jp, async { Ok("hello") }).await;
        assert_eq!(result, Ok("hello"));
    }
}
