//! Host detection and attachment of an interceptor chain to a client.
//!
//! The host is picked from the compilation target rather than by looking at
//! runtime globals, and the client to wrap is handed over explicitly. Nothing
//! is patched in place: [`Environment::attach`] returns a new
//! [`Intercepted`] client with the same call surface as the original.
//!
//! # Example
//!
//! ```ignore
//! use hookwire::Environment;
//!
//! let env = Environment::detect()?;
//! let registry = env.registry().clone();
//! let client = env.attach()?;
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::interceptor::{Intercepted, InterceptorRegistry};
use crate::{Error, HyperClient, Result};

/// Execution environment the crate was built for.
///
/// Variants are listed in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host {
    /// Native mobile application (Android or iOS).
    MobileBridge,
    /// Headless background runtime (WASI).
    Worker,
    /// Browser window (wasm without WASI).
    Browser,
    /// Server or desktop process.
    Server,
}

impl Host {
    /// All hosts, in detection order.
    pub const ALL: [Self; 4] = [Self::MobileBridge, Self::Worker, Self::Browser, Self::Server];

    /// Pick the host matching the compilation target. The first match wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEnvironment`] if no host matches.
    pub fn detect() -> Result<Self> {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            Ok(Self::MobileBridge)
        } else if cfg!(all(target_family = "wasm", target_os = "wasi")) {
            Ok(Self::Worker)
        } else if cfg!(target_family = "wasm") {
            Ok(Self::Browser)
        } else if cfg!(any(unix, windows)) {
            Ok(Self::Server)
        } else {
            Err(Error::unsupported_environment(format!(
                "{}-{}",
                std::env::consts::ARCH,
                std::env::consts::OS
            )))
        }
    }

    /// Stable name of the host.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MobileBridge => "mobile-bridge",
            Self::Worker => "worker",
            Self::Browser => "browser",
            Self::Server => "server",
        }
    }

    /// Returns `true` if the bundled hyper transport can run on this host.
    #[must_use]
    pub const fn has_native_transport(&self) -> bool {
        matches!(self, Self::MobileBridge | Self::Server)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|host| host.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unsupported_environment(s))
    }
}

/// Function used to obtain a client when none was supplied.
pub type Acquire<C> = fn(Host) -> Result<C>;

/// A host, the client to wrap, and the registry to route it through.
pub struct Environment<C = HyperClient> {
    host: Host,
    client: Option<C>,
    acquire: Option<Acquire<C>>,
    registry: InterceptorRegistry,
}

impl<C> fmt::Debug for Environment<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("host", &self.host)
            .field("has_client", &self.client.is_some())
            .field("can_acquire", &self.acquire.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

impl Environment {
    /// Environment for the detected host, acquiring a [`HyperClient`] on attach.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEnvironment`] if the host is not recognized.
    pub fn detect() -> Result<Self> {
        Host::detect().map(Self::new)
    }

    /// Environment for an explicit host, acquiring a [`HyperClient`] on attach.
    #[must_use]
    pub fn new(host: Host) -> Self {
        Self {
            host,
            client: None,
            acquire: Some(acquire_hyper_client),
            registry: InterceptorRegistry::new(),
        }
    }
}

impl<C> Environment<C> {
    /// Use `client` instead of acquiring one.
    #[must_use]
    pub fn with_client<D>(self, client: D) -> Environment<D> {
        Environment {
            host: self.host,
            client: Some(client),
            acquire: None,
            registry: self.registry,
        }
    }

    /// Use `acquire` to obtain a client when none was supplied.
    #[must_use]
    pub fn with_acquire<D>(self, acquire: Acquire<D>) -> Environment<D> {
        Environment {
            host: self.host,
            client: None,
            acquire: Some(acquire),
            registry: self.registry,
        }
    }

    /// Route through `registry` instead of a fresh one.
    #[must_use]
    pub fn with_registry(mut self, registry: InterceptorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The selected host.
    #[must_use]
    pub const fn host(&self) -> Host {
        self.host
    }

    /// The registry calls will be routed through.
    #[must_use]
    pub fn registry(&self) -> &InterceptorRegistry {
        &self.registry
    }

    /// Wrap the client so every call goes through the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientUnavailable`] if no client was supplied and none
    /// could be acquired for the host.
    pub fn attach(self) -> Result<Intercepted<C>> {
        let client = match (self.client, self.acquire) {
            (Some(client), _) => client,
            (None, Some(acquire)) => acquire(self.host)?,
            (None, None) => return Err(Error::client_unavailable(self.host.as_str())),
        };
        debug!(host = %self.host, "interceptor chain attached");
        Ok(Intercepted::new(client, self.registry))
    }
}

fn acquire_hyper_client(host: Host) -> Result<HyperClient> {
    if host.has_native_transport() {
        Ok(HyperClient::new())
    } else {
        Err(Error::client_unavailable(host.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::interceptor::FnInterceptor;
    use crate::{HttpClient, Method, Request, Response};

    #[derive(Clone)]
    struct Canned;

    impl HttpClient for Canned {
        async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
            let seen = request.header("X-Seen").unwrap_or("-").to_string();
            Ok(Response::new(200, HashMap::new(), Bytes::from(seen)))
        }
    }

    #[test]
    fn detect_on_test_host() {
        // tests run on a native target
        assert_eq!(Host::detect().expect("supported"), Host::Server);
    }

    #[test]
    fn host_names_round_trip() {
        for host in Host::ALL {
            assert_eq!(host.to_string().parse::<Host>().expect("known"), host);
        }
        let err = "toaster".parse::<Host>().expect_err("unknown");
        assert!(err.is_startup());
    }

    #[test]
    fn attach_without_transport_fails() {
        for host in [Host::Worker, Host::Browser] {
            let err = Environment::new(host).attach().expect_err("no client");
            assert_eq!(
                err.to_string(),
                format!("no HTTP client available on {host}, unable to register interceptors")
            );
        }
    }

    #[test]
    fn attach_with_failing_acquire() {
        let env = Environment::new(Host::Server).with_acquire::<Canned>(|host| {
            Err(Error::client_unavailable(host.as_str()))
        });
        assert!(matches!(
            env.attach(),
            Err(Error::ClientUnavailable { host }) if host == "server"
        ));
    }

    #[test]
    fn attach_acquires_hyper_client_on_server() {
        let client = Environment::new(Host::Server).attach().expect("attached");
        assert!(client.registry().is_empty());
    }

    #[tokio::test]
    async fn attach_routes_supplied_client_through_registry() {
        let registry = InterceptorRegistry::new();
        let client = Environment::new(Host::Browser)
            .with_registry(registry.clone())
            .with_client(Canned)
            .attach()
            .expect("attached");

        let _seen = registry.register(Arc::new(FnInterceptor::new().on_request(
            |mut request| async move {
                request
                    .headers_mut()
                    .insert("X-Seen".to_string(), "yes".to_string());
                Ok(request)
            },
        )));

        let url = url::Url::parse("https://example.com/").expect("valid URL");
        let response = client
            .execute(Request::builder(Method::Get, url).build())
            .await
            .expect("response");
        assert_eq!(response.body().as_ref(), b"yes");
    }
}
