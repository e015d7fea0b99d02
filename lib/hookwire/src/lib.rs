//! Request/response interceptor chains for async HTTP clients.
//!
//! Register [`interceptor::Interceptor`]s in an
//! [`interceptor::InterceptorRegistry`], wrap a client with it, and every call
//! goes through the chain:
//!
//! - request hooks, most recently registered first;
//! - the underlying call;
//! - response hooks, in registration order.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hookwire::prelude::*;
//!
//! let env = Environment::detect()?;
//! let registry = env.registry().clone();
//! let client = env.attach()?;
//!
//! let auth = registry.register(Arc::new(BearerAuthInterceptor::new("token")));
//! let response = client.get("https://api.example.com/me").await?;
//! auth.unregister();
//! ```

mod client;
mod config;
mod connector;
pub mod environment;
pub mod interceptor;
pub mod prelude;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};
pub use environment::{Environment, Host};

// Re-export tower for layer composition
pub use tower;

// Re-export core types
pub use hookwire_core::{
    ContentType, Error, HttpClient, HttpClientExt, Method, Request, RequestBuilder, Response,
    Result, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use hookwire_core::{StatusCode, header};

pub use url;
