//! HTTP method of a [`crate::Request`].

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// `GET`
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
    /// `DELETE`
    #[display("DELETE")]
    Delete,
    /// `PATCH`
    #[display("PATCH")]
    Patch,
    /// `HEAD`
    #[display("HEAD")]
    Head,
    /// `OPTIONS`
    #[display("OPTIONS")]
    Options,
}

impl Method {
    /// Returns `true` if a request with this method may carry a body.
    #[must_use]
    pub const fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        let method = match *method {
            http::Method::GET => Self::Get,
            http::Method::POST => Self::Post,
            http::Method::PUT => Self::Put,
            http::Method::DELETE => Self::Delete,
            http::Method::PATCH => Self::Patch,
            http::Method::HEAD => Self::Head,
            http::Method::OPTIONS => Self::Options,
            ref other => {
                return Err(crate::Error::invalid_request(format!(
                    "unsupported HTTP method: {other}"
                )));
            }
        };
        Ok(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn method_allows_body() {
        assert!(Method::Post.allows_body());
        assert!(Method::Patch.allows_body());
        assert!(!Method::Get.allows_body());
        assert!(!Method::Head.allows_body());
    }

    #[test]
    fn method_http_conversions() {
        assert_eq!(http::Method::from(Method::Put), http::Method::PUT);
        assert_eq!(
            Method::try_from(&http::Method::PATCH).expect("PATCH"),
            Method::Patch
        );
        assert!(Method::try_from(&http::Method::TRACE).is_err());
    }
}
