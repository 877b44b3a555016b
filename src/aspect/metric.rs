//! Slow-call metric aspect.

use super::{EventEmitter, Framing};
use crate::event::SlowMethodEvent;
use crate::joinpoint::JoinPoint;
use crate::serialization::{EMPTY_PARAMETERS, PARAMETERS_PLACEHOLDER};
use crate::settings::AspectSettings;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

const WARNING_FRAMING: Framing = Framing {
    keyed: false,
    type_header: None,
};

/// Times a call and publishes a `SLOW_METHOD` warning when it takes at least
/// the configured threshold.
#[derive(Clone)]
pub struct MetricAspect {
    emitter: EventEmitter,
    threshold: Duration,
}

impl MetricAspect {
    pub fn new(emitter: EventEmitter, threshold: Duration) -> Self {
        MetricAspect { emitter, threshold }
    }

    pub fn from_settings(emitter: EventEmitter, settings: &AspectSettings) -> Self {
        Self::new(emitter, settings.metrics_threshold())
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Await `call`, timing it on the monotonic clock.
    ///
    /// Whatever `call` produces, success or failure, is returned as-is.
    pub async fn measure<Fut: Future>(&self, join_point: &JoinPoint, call: Fut) -> Fut::Output {
        let start = Instant::now();
        let output = call.await;
        let elapsed = start.elapsed();

        if elapsed >= self.threshold {
            self.report_slow(join_point, elapsed);
        }

        output
    }

    fn report_slow(&self, join_point: &JoinPoint, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        let params = join_point.parameters_text();
        let params = if params.starts_with(PARAMETERS_PLACEHOLDER) {
            EMPTY_PARAMETERS.to_string()
        } else {
            params
        };

        let event = SlowMethodEvent::new(
            self.emitter.service_name().to_string(),
            join_point.signature().to_string(),
            elapsed_ms,
            params,
        );
        self.emitter.emit(&event, WARNING_FRAMING, "slow method warning");

        warn!(
            "SLOW_METHOD {} took {} ms",
            join_point.signature(),
            elapsed_ms
        );
    }
}
