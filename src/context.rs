//! Per-task HTTP request context.
//!
//! Web handlers install the current request with [`with_request`]; the HTTP
//! logging aspects read it back with [`current_request`]. The value follows
//! the task across worker threads and is gone once the scoped future ends.

use crate::error::{Error, Result};
use std::future::Future;

tokio::task_local! {
    static CURRENT_REQUEST: RequestInfo;
}

/// The parts of an inbound request the logging aspects report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestInfo {
    pub uri: String,
    /// Raw body, if the handler captured one.
    pub body: Option<String>,
}

impl RequestInfo {
    pub fn new(uri: impl Into<String>) -> Self {
        RequestInfo {
            uri: uri.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Run `fut` with `request` as the current request.
pub async fn with_request<F: Future>(request: RequestInfo, fut: F) -> F::Output {
    CURRENT_REQUEST.scope(request, fut).await
}

/// The request installed by the nearest enclosing [`with_request`].
///
/// # Errors
///
/// Returns `Error::ContextUnavailable` outside any request scope.
pub fn current_request() -> Result<RequestInfo> {
    CURRENT_REQUEST
        .try_with(RequestInfo::clone)
        .map_err(|_| Error::ContextUnavailable("no HTTP request in scope".to_string()))
}
