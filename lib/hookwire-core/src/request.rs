//! Typed request descriptor.
//!
//! A [`Request`] is what flows through the request side of an interceptor
//! pipeline: each request hook receives one and hands back a (possibly
//! rewritten) one.
//!
//! # Example
//!
//! ```
//! use hookwire_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let request = Request::<Bytes>::builder(Method::Get, "https://api.example.com".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .build();
//! assert_eq!(request.url().query(), Some("page=1"));
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::Method;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// Rebuild a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        url: url::Url,
        headers: HashMap<String, String>,
        body: Option<B>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Mutable access to the URL.
    pub fn url_mut(&mut self) -> &mut url::Url {
        &mut self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// Set a header, replacing every entry whose name matches ignoring ASCII
    /// case. Returns the replaced value, if any.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        set_header(&mut self.headers, name.into(), value.into())
    }

    /// Remove a header by name, ignoring ASCII case.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        remove_header(&mut self.headers, name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Replace the body, returning the previous one.
    pub fn set_body(&mut self, body: Option<B>) -> Option<B> {
        std::mem::replace(&mut self.body, body)
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }

    /// Turn the request back into a builder, keeping everything set so far.
    #[must_use]
    pub fn into_builder(self) -> RequestBuilder<B> {
        RequestBuilder {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any entry with the same name in another case.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Sets multiple headers, as [`RequestBuilder::header`] does for one.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in headers {
            set_header(&mut self.headers, name, value);
        }
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl RequestBuilder<Bytes> {
    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header("Content-Type", crate::ContentType::Json.as_str())
            .body(body))
    }
}

fn remove_header(headers: &mut HashMap<String, String>, name: &str) -> Option<String> {
    let mut removed = None;
    headers.retain(|key, value| {
        if key.eq_ignore_ascii_case(name) {
            removed = Some(std::mem::take(value));
            false
        } else {
            true
        }
    });
    removed
}

fn set_header(
    headers: &mut HashMap<String, String>,
    name: String,
    value: String,
) -> Option<String> {
    let previous = remove_header(headers, &name);
    headers.insert(name, value);
    previous
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    fn users_url() -> url::Url {
        url::Url::parse("https://api.example.com/users").expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::<Bytes>::builder(Method::Get, users_url())
            .header("Accept", "application/json")
            .query("page", "1")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/users?page=1");
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn request_builder_json() {
        let request = Request::builder(Method::Post, users_url())
            .json(&serde_json::json!({"name": "test"}))
            .expect("json")
            .build();

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body().map(Bytes::as_ref),
            Some(br#"{"name":"test"}"#.as_slice())
        );
    }

    #[test]
    fn request_parts_round_trip() {
        let request = Request::builder(Method::Put, users_url())
            .header("X-Trace", "a")
            .body(Bytes::from_static(b"payload"))
            .build();

        let (method, url, headers, body) = request.clone().into_parts();
        let rebuilt = Request::from_parts(method, url, headers, body);
        assert_eq!(rebuilt, request);
    }

    #[test]
    fn request_mutation() {
        let mut request = Request::<Bytes>::builder(Method::Get, users_url()).build();
        request
            .headers_mut()
            .insert("X-Visited".to_string(), "B".to_string());
        request.url_mut().set_path("/accounts");
        let previous = request.set_body(Some(Bytes::from_static(b"x")));

        assert!(previous.is_none());
        assert_eq!(request.header("X-Visited"), Some("B"));
        assert_eq!(request.url().path(), "/accounts");

        let request = request.into_builder().header("X-Visited", "B,A").build();
        assert_eq!(request.header("X-Visited"), Some("B,A"));
        assert!(request.body().is_some());
    }

    #[test]
    fn headers_ignore_ascii_case() {
        let mut request = Request::<Bytes>::builder(Method::Get, users_url())
            .header("authorization", "Basic stale")
            .header("Accept", "text/plain")
            .header("ACCEPT", "application/json")
            .build();

        check!(request.headers().len() == 2);
        check!(request.header("Accept") == Some("application/json"));
        check!(request.header("AUTHORIZATION") == Some("Basic stale"));

        let previous = request.set_header("Authorization", "Bearer fresh");
        check!(previous.as_deref() == Some("Basic stale"));
        check!(request.headers().len() == 2);
        check!(request.headers().get("Authorization").map(String::as_str) == Some("Bearer fresh"));

        check!(request.remove_header("accept").as_deref() == Some("application/json"));
        check!(request.header("Accept").is_none());
        check!(request.remove_header("accept").is_none());
    }
}
