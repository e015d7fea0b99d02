//! HTTP client traits.
//!
//! - [`HttpClient`] - the call surface that interceptors wrap
//! - [`HttpClientExt`] - verb helpers built on top of [`HttpClient::execute`]
//!
//! Every implementation of [`HttpClient`] gets the helpers for free, so an
//! intercepted client exposes exactly the same surface as the one it wraps.

use std::future::Future;

use bytes::Bytes;

use crate::{Method, Request, Response, Result};

/// Core HTTP client trait.
///
/// This trait defines the interface for executing HTTP requests.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - A hook in the interceptor chain rejecting the call
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

/// Extension trait for [`HttpClient`] with convenience methods.
pub trait HttpClientExt: HttpClient {
    /// Execute a GET request.
    fn get(&self, url: &str) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(Method::Get, url).build();
            self.execute(request).await
        }
    }

    /// Execute a POST request with a JSON body.
    fn post_json<T: serde::Serialize + Send + Sync>(
        &self,
        url: &str,
        body: &T,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(Method::Post, url).json(body)?.build();
            self.execute(request).await
        }
    }

    /// Execute a PUT request with a JSON body.
    fn put_json<T: serde::Serialize + Send + Sync>(
        &self,
        url: &str,
        body: &T,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(Method::Put, url).json(body)?.build();
            self.execute(request).await
        }
    }

    /// Execute a DELETE request.
    fn delete(&self, url: &str) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(Method::Delete, url).build();
            self.execute(request).await
        }
    }
}

// Blanket implementation for all HttpClient implementors
impl<T: HttpClient> HttpClientExt for T {}
