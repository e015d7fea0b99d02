//! Request/response logging interceptor.
//!
//! Logs each stage with the `tracing` crate. Failures are logged and handed
//! on unchanged.

use std::collections::{BTreeMap, HashMap};
use std::future;

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::{HookFuture, Interceptor};
use crate::{Error, Request, Response};

/// Log level for the logging interceptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (request/response details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

/// Interceptor that logs requests, responses and failures.
///
/// Registered last, its request hook sees the request before any other hook
/// touches it; registered first, it sees the request as it goes on the wire.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use hookwire::interceptor::LoggingInterceptor;
///
/// registry.register(Arc::new(LoggingInterceptor::debug()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor {
    level: LogLevel,
}

impl LoggingInterceptor {
    /// Create a logging interceptor with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging interceptor that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

/// Headers whose values never reach the logs.
const SENSITIVE_HEADERS: [&str; 5] = [
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Headers sorted by name, credentials replaced by `<redacted>`.
fn loggable_headers(headers: &HashMap<String, String>) -> BTreeMap<&str, &str> {
    headers
        .iter()
        .map(|(name, value)| {
            let sensitive = SENSITIVE_HEADERS
                .iter()
                .any(|candidate| name.eq_ignore_ascii_case(candidate));
            (name.as_str(), if sensitive { "<redacted>" } else { value.as_str() })
        })
        .collect()
}

impl Interceptor for LoggingInterceptor {
    fn request(&self, request: Request<Bytes>) -> HookFuture<'_, Request<Bytes>> {
        let method = request.method();
        let url = request.url();
        match self.level {
            LogLevel::Debug => {
                debug!(
                    method = %method,
                    url = %url,
                    headers = ?loggable_headers(request.headers()),
                    "sending request"
                );
            }
            LogLevel::Info => {
                info!(method = %method, url = %url, "sending request");
            }
        }
        Box::pin(future::ready(Ok(request)))
    }

    fn request_error(&self, error: Error) -> HookFuture<'_, Request<Bytes>> {
        warn!(error = %error, "request rejected before sending");
        Box::pin(future::ready(Err(error)))
    }

    fn response(&self, response: Response<Bytes>) -> HookFuture<'_, Response<Bytes>> {
        let status = response.status();
        if response.is_success() {
            match self.level {
                LogLevel::Debug => debug!(
                    status,
                    headers = ?loggable_headers(response.headers()),
                    body_len = response.body().len(),
                    "request completed"
                ),
                LogLevel::Info => info!(status, "request completed"),
            }
        } else {
            warn!(status, "request failed with HTTP error");
        }
        Box::pin(future::ready(Ok(response)))
    }

    fn response_error(&self, error: Error) -> HookFuture<'_, Response<Bytes>> {
        warn!(error = %error, "request failed");
        Box::pin(future::ready(Err(error)))
    }
}
