//! # aspect-kit
//!
//! Cross-cutting call wrappers for async Rust services.
//!
//! ## Features
//!
//! - **Result caching:** Memoize any operation in a TTL cache keyed by its arguments
//! - **HTTP logging:** `INCOME` / `OUTCOME` events for request handlers
//! - **Error events:** `ERROR` events for failed datasource calls, error returned untouched
//! - **Slow-call metrics:** `WARNING` / `SLOW_METHOD` events above a threshold
//! - **Non-blocking publishing:** Events go through a bounded buffer to any transport (Kafka behind the `kafka` feature)
//! - **Explicit decoration:** No macros or proxies, every aspect takes the real operation as a value
//!
//! ## Quick Start
//!
//! ```ignore
//! use aspect_kit::{
//!     AspectSettings, Aspects, JoinPoint,
//!     context::{with_request, RequestInfo},
//!     publish::LogSink,
//! };
//!
//! // 1. Build the aspects once (settings from files/env, events to the log)
//! let (aspects, _drain) = Aspects::with_sink(AspectSettings::load()?, LogSink)?;
//! let users = aspects.cached::<User>();
//!
//! // 2. Describe the call
//! let jp = JoinPoint::new("UserRepository::find_by_id(id: i64)").arg(id);
//!
//! // 3. Compose the aspects around the real operation
//! let user = aspects
//!     .metric()
//!     .measure(&jp, aspects.datasource_error().around(&jp, async {
//!         users.around("user", &jp, || repo.find_by_id(id)).await
//!     }))
//!     .await?;
//!
//! // HTTP handlers install the request so INCOME/OUTCOME events can report it
//! let response = with_request(RequestInfo::new("/users/42"), async {
//!     aspects.http_outcome().around(&jp, handler(id)).await
//! })
//! .await;
//! ```

#[macro_use]
extern crate log;

pub mod aspect;
pub mod cache;
pub mod context;
pub mod error;
pub mod event;
pub mod joinpoint;
pub mod key;
pub mod observability;
pub mod publish;
pub mod serialization;
pub mod service;
pub mod settings;

// Re-exports for convenience
pub use aspect::{
    CachedAspect, DatasourceErrorAspect, EventEmitter, HttpIncomeLogAspect, HttpOutcomeLogAspect,
    MetricAspect,
};
pub use cache::{CapacityPolicy, ResultCache};
pub use error::{Error, Result};
pub use joinpoint::{Arg, JoinPoint};
pub use key::{CacheKeyBuilder, KeyArg};
pub use publish::{EventPublisher, EventSink, OutboundMessage};
pub use service::Aspects;
pub use settings::AspectSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
