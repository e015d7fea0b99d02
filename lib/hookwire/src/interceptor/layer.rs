//! Tower integration: wrap any client so its calls go through a registry.
//!
//! [`Intercepted`] keeps the call surface of what it wraps. It is a
//! [`tower::Service`] when the inner value is a service, and an
//! [`HttpClient`] when the inner value is a client, so existing callers do not
//! change.

use std::future::Future;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};

use super::InterceptorRegistry;
use crate::{Error, HttpClient, Request, Response, Result, ServiceFuture};

/// Layer that routes requests through an [`InterceptorRegistry`].
///
/// # Example
///
/// ```ignore
/// use hookwire::interceptor::{InterceptorLayer, InterceptorRegistry};
/// use tower::ServiceBuilder;
///
/// let registry = InterceptorRegistry::new();
/// let service = ServiceBuilder::new()
///     .layer(InterceptorLayer::new(registry.clone()))
///     .service(client);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterceptorLayer {
    registry: InterceptorRegistry,
}

impl InterceptorLayer {
    /// Create a layer backed by the given registry.
    #[must_use]
    pub fn new(registry: InterceptorRegistry) -> Self {
        Self { registry }
    }

    /// The registry used by services built from this layer.
    #[must_use]
    pub fn registry(&self) -> &InterceptorRegistry {
        &self.registry
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = Intercepted<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Intercepted::new(inner, self.registry.clone())
    }
}

/// A client or service whose calls run through an interceptor chain.
#[derive(Debug, Clone)]
pub struct Intercepted<S> {
    inner: S,
    registry: InterceptorRegistry,
}

impl<S> Intercepted<S> {
    /// Wrap `inner` with the interceptors of `registry`.
    pub fn new(inner: S, registry: InterceptorRegistry) -> Self {
        Self { inner, registry }
    }

    /// The registry this wrapper dispatches through.
    #[must_use]
    pub fn registry(&self) -> &InterceptorRegistry {
        &self.registry
    }

    /// The wrapped value.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap, dropping the interception.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<C> HttpClient for Intercepted<C>
where
    C: HttpClient + Clone + 'static,
{
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        let inner = self.inner.clone();
        self.registry.dispatch(
            move |request| async move { inner.execute(request).await },
            request,
        )
    }
}

impl<S> Service<Request<Bytes>> for Intercepted<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        // keep the service that was polled ready
        let clone = self.inner.clone();
        let mut ready = std::mem::replace(&mut self.inner, clone);
        self.registry.dispatch(
            move |request| async move { ready.call(request).await },
            request,
        )
    }
}
