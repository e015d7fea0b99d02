//! Quickstart
//!
//! Attaches an interceptor chain to the default client, then shows that
//! interceptors registered or removed later apply to the next call.
//!
//! ```sh
//! RUST_LOG=hookwire=trace,info cargo run -p quickstart-demo -- https://httpbin.org
//! ```

// Example-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use std::sync::Arc;

use hookwire::prelude::*;
use tracing_subscriber::EnvFilter;

/// Shape of the JSON echoed back by `/anything`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub headers: std::collections::HashMap<String, String>,
}

/// Registry with a logging interceptor and a request tagger.
fn default_chain(registry: &InterceptorRegistry) -> Vec<Registration> {
    let tagger = FnInterceptor::new().on_request(|mut request| async move {
        request
            .headers_mut()
            .insert("X-Demo".to_string(), "quickstart".to_string());
        Ok(request)
    });

    vec![
        registry.register(Arc::new(LoggingInterceptor::new())),
        registry.register(Arc::new(tagger)),
    ]
}

async fn run(base_url: &str, token: Option<String>) -> hookwire::Result<Echo> {
    let env = Environment::detect()?;
    tracing::info!(host = %env.host(), "environment detected");

    let registry = env.registry().clone();
    let client = env.attach()?;
    let _chain = default_chain(&registry);

    let auth = token.map(|token| registry.register(Arc::new(BearerAuthInterceptor::new(token))));

    let endpoint = format!("{base_url}/anything");
    let echo: Echo = client.get(&endpoint).await?.error_for_status()?.json()?;

    if let Some(auth) = auth {
        auth.unregister();
    }
    Ok(echo)
}

#[tokio::main]
async fn main() -> hookwire::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org".to_string());
    let token = std::env::var("HOOKWIRE_TOKEN").ok();

    let echo = run(&base_url, token).await?;

    println!("Headers seen by {base_url}:");
    let mut headers: Vec<_> = echo.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("  {name}: {value}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    #[tokio::test]
    async fn test_run_sends_tagged_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/anything"))
            .and(header("X-Demo", "quickstart"))
            .and(header("Authorization", "Bearer demo-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(echoed()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let echo = run(&mock_server.uri(), Some("demo-token".to_string()))
            .await
            .expect("echo");
        assert_eq!(
            echo.headers.get("X-Demo").map(String::as_str),
            Some("quickstart")
        );
    }

    #[tokio::test]
    async fn test_run_reports_http_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/anything"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = run(&mock_server.uri(), None).await.expect_err("503");
        assert!(err.is_server_error());
    }

    fn echoed() -> Echo {
        Echo {
            headers: [("X-Demo".to_string(), "quickstart".to_string())]
                .into_iter()
                .collect(),
        }
    }
}
