//! Core types and traits for the hookwire interceptor chain.
//!
//! This crate provides the transport-neutral building blocks used by `hookwire`:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - the typed request descriptor that interceptors rewrite
//! - [`Response`] - HTTP response type
//! - [`Error`] and [`Result`] - Error handling, shared by transports and interceptors
//! - [`HttpClient`] - Core client trait for HTTP execution
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)

mod body;
mod client;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, to_json};
pub use client::{HttpClient, HttpClientExt};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
