//! Interceptors and the chain they form around an HTTP call.
//!
//! An [`Interceptor`] has up to four hooks. Any of them may be left out, in
//! which case the value (or error) is passed along untouched:
//!
//! | Hook | Receives | Runs when |
//! |------|----------|-----------|
//! | [`Interceptor::request`] | `Request` | the previous request stage succeeded |
//! | [`Interceptor::request_error`] | `Error` | the previous request stage failed |
//! | [`Interceptor::response`] | `Response` | the call (or previous response stage) succeeded |
//! | [`Interceptor::response_error`] | `Error` | the call (or previous response stage) failed |
//!
//! Interceptors live in an [`InterceptorRegistry`]. For every call the registry
//! builds an onion: request hooks run from the most recently registered
//! interceptor to the oldest, then the underlying call, then response hooks
//! from the oldest to the newest.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hookwire::interceptor::{FnInterceptor, InterceptorRegistry};
//!
//! let registry = InterceptorRegistry::new();
//! let tenant = registry.register(Arc::new(FnInterceptor::new().on_request(|mut request| async move {
//!     request.set_header("X-Tenant", "acme");
//!     Ok(request)
//! })));
//!
//! let client = HyperClient::builder().with_interceptors(registry.clone()).build();
//! // ...
//! tenant.unregister();
//! ```

mod bearer_auth;
mod layer;
mod logging;
mod registry;

use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Error, Request, Response, Result};

pub use bearer_auth::BearerAuthInterceptor;
pub use layer::{Intercepted, InterceptorLayer};
pub use logging::{LogLevel, LoggingInterceptor};
pub use registry::{InterceptorRegistry, Registration};

/// Future returned by a hook.
pub type HookFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A set of optional hooks invoked around an HTTP call.
///
/// Every method has a pass-through default, so an implementation only
/// overrides the hooks it cares about. An error hook may recover by returning
/// `Ok`, in which case the next stage sees a success again.
pub trait Interceptor: Send + Sync {
    /// Transform the outgoing request.
    fn request(&self, request: Request<Bytes>) -> HookFuture<'_, Request<Bytes>> {
        Box::pin(future::ready(Ok(request)))
    }

    /// Handle a failure raised by an earlier request stage.
    fn request_error(&self, error: Error) -> HookFuture<'_, Request<Bytes>> {
        Box::pin(future::ready(Err(error)))
    }

    /// Transform the incoming response.
    fn response(&self, response: Response<Bytes>) -> HookFuture<'_, Response<Bytes>> {
        Box::pin(future::ready(Ok(response)))
    }

    /// Handle a failure raised by the call or an earlier response stage.
    fn response_error(&self, error: Error) -> HookFuture<'_, Response<Bytes>> {
        Box::pin(future::ready(Err(error)))
    }
}

type RequestHook = Arc<dyn Fn(Request<Bytes>) -> HookFuture<'static, Request<Bytes>> + Send + Sync>;
type ResponseHook =
    Arc<dyn Fn(Response<Bytes>) -> HookFuture<'static, Response<Bytes>> + Send + Sync>;
type RequestErrorHook = Arc<dyn Fn(Error) -> HookFuture<'static, Request<Bytes>> + Send + Sync>;
type ResponseErrorHook = Arc<dyn Fn(Error) -> HookFuture<'static, Response<Bytes>> + Send + Sync>;

/// An interceptor assembled from closures.
///
/// Hooks that are not set fall back to the [`Interceptor`] defaults.
///
/// # Example
///
/// ```ignore
/// use hookwire::interceptor::FnInterceptor;
/// use hookwire::Error;
///
/// let guard = FnInterceptor::new()
///     .on_request(|request| async move {
///         if request.header("Authorization").is_none() {
///             return Err(Error::interceptor("missing credentials"));
///         }
///         Ok(request)
///     })
///     .on_response_error(|error| async move {
///         tracing::warn!(%error, "call failed");
///         Err(error)
///     });
/// ```
#[derive(Clone, Default)]
pub struct FnInterceptor {
    request: Option<RequestHook>,
    request_error: Option<RequestErrorHook>,
    response: Option<ResponseHook>,
    response_error: Option<ResponseErrorHook>,
}

impl FnInterceptor {
    /// Create an interceptor with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request hook.
    #[must_use]
    pub fn on_request<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Request<Bytes>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request<Bytes>>> + Send + 'static,
    {
        self.request = Some(Arc::new(
            move |request| -> HookFuture<'static, Request<Bytes>> { Box::pin(hook(request)) },
        ));
        self
    }

    /// Set the request error hook.
    #[must_use]
    pub fn on_request_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request<Bytes>>> + Send + 'static,
    {
        self.request_error = Some(Arc::new(
            move |error| -> HookFuture<'static, Request<Bytes>> { Box::pin(hook(error)) },
        ));
        self
    }

    /// Set the response hook.
    #[must_use]
    pub fn on_response<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response<Bytes>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<Bytes>>> + Send + 'static,
    {
        self.response = Some(Arc::new(
            move |response| -> HookFuture<'static, Response<Bytes>> { Box::pin(hook(response)) },
        ));
        self
    }

    /// Set the response error hook.
    #[must_use]
    pub fn on_response_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<Bytes>>> + Send + 'static,
    {
        self.response_error = Some(Arc::new(
            move |error| -> HookFuture<'static, Response<Bytes>> { Box::pin(hook(error)) },
        ));
        self
    }
}

impl fmt::Debug for FnInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("request", &self.request.is_some())
            .field("request_error", &self.request_error.is_some())
            .field("response", &self.response.is_some())
            .field("response_error", &self.response_error.is_some())
            .finish()
    }
}

impl Interceptor for FnInterceptor {
    fn request(&self, request: Request<Bytes>) -> HookFuture<'_, Request<Bytes>> {
        match &self.request {
            Some(hook) => hook(request),
            None => Box::pin(future::ready(Ok(request))),
        }
    }

    fn request_error(&self, error: Error) -> HookFuture<'_, Request<Bytes>> {
        match &self.request_error {
            Some(hook) => hook(error),
            None => Box::pin(future::ready(Err(error))),
        }
    }

    fn response(&self, response: Response<Bytes>) -> HookFuture<'_, Response<Bytes>> {
        match &self.response {
            Some(hook) => hook(response),
            None => Box::pin(future::ready(Ok(response))),
        }
    }

    fn response_error(&self, error: Error) -> HookFuture<'_, Response<Bytes>> {
        match &self.response_error {
            Some(hook) => hook(error),
            None => Box::pin(future::ready(Err(error))),
        }
    }
}
