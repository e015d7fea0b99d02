//! Prelude module for convenient imports.
//!
//! ```ignore
//! use hookwire::prelude::*;
//! ```

pub use crate::interceptor::{
    BearerAuthInterceptor, FnInterceptor, Intercepted, Interceptor, InterceptorLayer,
    InterceptorRegistry, LoggingInterceptor, Registration,
};
pub use crate::{
    ClientConfig, ContentType, Environment, Error, Host, HttpClient, HttpClientExt, HyperClient,
    Method, Request, RequestBuilder, Response, Result, StatusCode, from_json, header, to_json,
};
pub use serde::{Deserialize, Serialize};
