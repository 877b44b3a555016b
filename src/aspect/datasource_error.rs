//! Datasource error logging aspect.

use super::{EventEmitter, Framing};
use crate::event::{timestamp_now, ErrorEvent, EventType};
use crate::joinpoint::JoinPoint;
use std::fmt::{Debug, Display};
use std::future::Future;

const ERROR_FRAMING: Framing = Framing {
    keyed: true,
    type_header: Some(EventType::Error),
};

/// Multi-line `Debug` rendering of an error.
///
/// Derived `Debug` output carries nested source fields, and `anyhow`-style
/// reports print their own cause chain, so no `source()` walk is needed.
pub fn render_stack_trace<E: Debug + ?Sized>(err: &E) -> String {
    format!("{:#?}", err)
}

/// Publishes an `ERROR` event when a datasource call fails.
///
/// Any error that is `Debug + Display` can be wrapped: concrete error types,
/// `Box<dyn Error + Send + Sync>` and report types such as `anyhow::Error`.
/// The failure itself is always handed back to the caller unchanged.
#[derive(Clone)]
pub struct DatasourceErrorAspect {
    emitter: EventEmitter,
}

impl DatasourceErrorAspect {
    pub fn new(emitter: EventEmitter) -> Self {
        DatasourceErrorAspect { emitter }
    }

    /// Publish the `ERROR` event for `join_point` and `err`.
    pub fn log_error<E: Debug + Display + ?Sized>(&self, join_point: &JoinPoint, err: &E) {
        error!(
            "Datasource error occurred in method: {}",
            join_point.short_signature()
        );

        let exception_message = err.to_string();
        let method_parameters = join_point.parameters_text();

        let event = ErrorEvent {
            timestamp: timestamp_now(),
            method_signature: join_point.signature().to_string(),
            stack_trace: render_stack_trace(err),
            exception_message: exception_message.clone(),
            method_parameters: method_parameters.clone(),
            service_name: self.emitter.service_name().to_string(),
            event_type: EventType::Error,
        };
        self.emitter.emit(&event, ERROR_FRAMING, "error log");

        error!(
            "Error details - Method: {}, Exception: {}, Parameters: {}",
            join_point.signature(),
            exception_message,
            method_parameters
        );
    }

    /// Run the call and log its error, if any, before returning it.
    pub async fn around<T, E, Fut>(&self, join_point: &JoinPoint, call: Fut) -> Result<T, E>
    where
        E: Debug + Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let result = call.await;
        if let Err(err) = &result {
            self.log_error(join_point, err);
        }
        result
    }
}
