//! Bearer token authentication interceptor.
//!
//! Adds an `Authorization: Bearer <token>` header to every outgoing request.

use std::future;
use std::sync::Arc;

use bytes::Bytes;

use super::{HookFuture, Interceptor};
use crate::Request;

/// Interceptor that adds bearer token authentication to requests.
///
/// An `Authorization` header already set by the caller, or by a hook that ran
/// earlier, is overwritten whatever the case of its name.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use hookwire::interceptor::BearerAuthInterceptor;
///
/// let auth = registry.register(Arc::new(BearerAuthInterceptor::new("my-secret-token")));
/// // later, on logout
/// auth.unregister();
/// ```
#[derive(Clone)]
pub struct BearerAuthInterceptor {
    token: Arc<str>,
}

impl std::fmt::Debug for BearerAuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthInterceptor")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BearerAuthInterceptor {
    /// Create a new bearer auth interceptor with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl Interceptor for BearerAuthInterceptor {
    fn request(&self, mut request: Request<Bytes>) -> HookFuture<'_, Request<Bytes>> {
        request.set_header("Authorization", format!("Bearer {}", self.token));
        Box::pin(future::ready(Ok(request)))
    }
}
