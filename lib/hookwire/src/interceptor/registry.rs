//! Ordered interceptor registry and per-call pipeline construction.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::Bytes;
use tracing::{Instrument, debug_span, trace};

use super::Interceptor;
use crate::{Request, Response, Result, ServiceFuture};

type Chain = Vec<Arc<dyn Interceptor>>;

/// Shared, ordered list of interceptors.
///
/// Cloning the registry gives another handle to the same list, so a client
/// built with one clone sees interceptors registered through another.
///
/// Insertion order matters and duplicates are kept: registering the same
/// interceptor twice makes it run twice.
#[derive(Clone, Default)]
pub struct InterceptorRegistry {
    entries: Arc<Mutex<Chain>>,
}

impl fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl InterceptorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Chain> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an interceptor to the end of the chain.
    ///
    /// The returned [`Registration`] removes this interceptor again. Identity is
    /// the `Arc` allocation, so register clones of the same `Arc` to get
    /// several entries for one interceptor.
    pub fn register(&self, interceptor: Arc<dyn Interceptor>) -> Registration {
        self.lock().push(Arc::clone(&interceptor));
        Registration {
            entries: Arc::downgrade(&self.entries),
            interceptor,
            removed: AtomicBool::new(false),
        }
    }

    /// Remove every interceptor.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Route a call through the current chain.
    ///
    /// The chain is captured before this method returns; later changes to the
    /// registry do not affect the returned future. Nothing else runs until the
    /// future is polled. Then:
    ///
    /// 1. request hooks run from the last registered interceptor to the first,
    ///    with `request_error` taking over once a stage has failed;
    /// 2. `call` receives the final request, unless a request stage failed, in
    ///    which case the error skips it;
    /// 3. response hooks run from the first registered interceptor to the last,
    ///    with `response_error` taking over once a stage (or the call) failed.
    ///
    /// Errors are never swallowed here: whatever is left after the last stage
    /// is returned to the caller.
    pub fn dispatch<F, Fut>(&self, call: F, request: Request<Bytes>) -> ServiceFuture
    where
        F: FnOnce(Request<Bytes>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Response<Bytes>>> + Send + 'static,
    {
        let chain = self.lock().clone();
        let span = debug_span!(
            "interceptor_pipeline",
            interceptors = chain.len(),
            method = %request.method(),
            url = %request.url(),
        );
        Box::pin(run_pipeline(chain, call, request).instrument(span))
    }
}

async fn run_pipeline<F, Fut>(
    chain: Chain,
    call: F,
    request: Request<Bytes>,
) -> Result<Response<Bytes>>
where
    F: FnOnce(Request<Bytes>) -> Fut,
    Fut: Future<Output = Result<Response<Bytes>>>,
{
    let mut outgoing = Ok(request);
    for interceptor in chain.iter().rev() {
        outgoing = match outgoing {
            Ok(request) => interceptor.request(request).await,
            Err(error) => interceptor.request_error(error).await,
        };
    }

    let mut incoming = match outgoing {
        Ok(request) => call(request).await,
        Err(error) => {
            trace!(%error, "request phase failed, skipping call");
            Err(error)
        }
    };

    for interceptor in &chain {
        incoming = match incoming {
            Ok(response) => interceptor.response(response).await,
            Err(error) => interceptor.response_error(error).await,
        };
    }

    trace!(ok = incoming.is_ok(), "pipeline settled");
    incoming
}

/// Handle returned by [`InterceptorRegistry::register`].
///
/// Dropping the handle leaves the interceptor registered.
pub struct Registration {
    entries: Weak<Mutex<Chain>>,
    interceptor: Arc<dyn Interceptor>,
    removed: AtomicBool,
}

impl Registration {
    /// Remove the registered interceptor from the chain.
    ///
    /// Removes a single entry, the first one with the same identity. Once a
    /// call has removed an entry, further calls on the same handle do nothing.
    /// It is also a no-op if the entry is already gone (e.g. after
    /// [`InterceptorRegistry::clear`]).
    ///
    /// Returns `true` if an entry was removed.
    pub fn unregister(&self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };
        let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
        if self.removed.load(Ordering::Acquire) {
            return false;
        }
        let target = Arc::as_ptr(&self.interceptor);
        let position = entries
            .iter()
            .position(|entry| std::ptr::addr_eq(Arc::as_ptr(entry), target));
        match position {
            Some(index) => {
                entries.remove(index);
                self.removed.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// The registered interceptor.
    #[must_use]
    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("removed", &self.removed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
