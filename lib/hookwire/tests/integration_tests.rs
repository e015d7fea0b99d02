//! Integration tests for `HyperClient` and interceptors using wiremock.

use std::sync::Arc;
use std::time::Duration;

use hookwire::interceptor::{
    BearerAuthInterceptor, FnInterceptor, Intercepted, InterceptorRegistry, LoggingInterceptor,
};
use hookwire::{Environment, Error, Host, HttpClient, HttpClientExt, HyperClient, Method, Request};
use serde::{Deserialize, Serialize};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, header_exists, method, path},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

fn url(server: &MockServer, route: &str) -> url::Url {
    url::Url::parse(&format!("{}{route}", server.uri())).expect("url")
}

fn tag(name: &'static str, value: &'static str) -> Arc<FnInterceptor> {
    Arc::new(FnInterceptor::new().on_request(move |mut request| async move {
        request
            .headers_mut()
            .insert(name.to_string(), value.to_string());
        Ok(request)
    }))
}

#[tokio::test]
async fn test_plain_client_get() {
    let mock_server = MockServer::start().await;

    let user = User {
        id: 1,
        name: "Alice".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&user))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let request = Request::builder(Method::Get, url(&mock_server, "/users/1"))
        .header("Accept", "application/json")
        .build();

    let response = client.execute(request).await.expect("response");

    assert!(response.is_success());
    let body: User = response.json().expect("json");
    assert_eq!(body, user);
}

#[tokio::test]
async fn test_interceptor_headers_reach_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tagged"))
        .and(header("X-Request-Id", "req-7"))
        .and(header("X-Tenant", "acme"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let _id = registry.register(tag("X-Request-Id", "req-7"));
    let _tenant = registry.register(tag("X-Tenant", "acme"));

    let client = HyperClient::builder()
        .with_interceptors(registry.clone())
        .build();

    let response = client
        .get(url(&mock_server, "/tagged").as_str())
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_later_registration_applies_to_built_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/late"))
        .and(header("X-Late", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tagged"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/late"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let client = HyperClient::builder()
        .with_interceptors(registry.clone())
        .build();
    let target = url(&mock_server, "/late");

    let before = client.get(target.as_str()).await.expect("response");
    assert_eq!(before.text().expect("utf-8"), "plain");

    let late = registry.register(tag("X-Late", "yes"));
    let during = client.get(target.as_str()).await.expect("response");
    assert_eq!(during.text().expect("utf-8"), "tagged");

    assert!(late.unregister());
    let after = client.get(target.as_str()).await.expect("response");
    assert_eq!(after.text().expect("utf-8"), "plain");
}

#[tokio::test]
async fn test_bearer_auth_interceptor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("Authorization", "Bearer s3cr3t"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(User {
            id: 0,
            name: "Bob".to_string(),
        }))
        .respond_with(ResponseTemplate::new(201).set_body_json(User {
            id: 42,
            name: "Bob".to_string(),
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let _auth = registry.register(Arc::new(BearerAuthInterceptor::new("s3cr3t")));
    let client = Intercepted::new(HyperClient::new(), registry);

    let input = User {
        id: 0,
        name: "Bob".to_string(),
    };
    let response = client
        .post_json(url(&mock_server, "/users").as_str(), &input)
        .await
        .expect("response");

    assert_eq!(response.status(), 201);
    let created: User = response.json().expect("json");
    assert_eq!(created.id, 42);
}

#[tokio::test]
async fn test_http_error_routed_to_response_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let _strict = registry.register(Arc::new(
        FnInterceptor::new().on_response(|response| async move { response.error_for_status() }),
    ));
    let _logging = registry.register(Arc::new(LoggingInterceptor::debug()));

    let client = HyperClient::builder()
        .with_interceptors(registry)
        .build();

    let err = client
        .delete(url(&mock_server, "/users/9").as_str())
        .await
        .expect_err("404 should be an error");

    assert_eq!(err.status(), Some(404));
    assert!(err.is_client_error());
    assert_eq!(err.body().map(|b| &b[..]), Some(&b"no such user"[..]));
}

#[tokio::test]
async fn test_rejected_request_never_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let _guard = registry.register(Arc::new(FnInterceptor::new().on_request(
        |request| async move {
            if request.header("Authorization").is_none() {
                return Err(Error::interceptor("missing credentials"));
            }
            Ok(request)
        },
    )));

    let client = HyperClient::builder()
        .with_interceptors(registry)
        .build();

    let err = client
        .get(url(&mock_server, "/private").as_str())
        .await
        .expect_err("rejected");
    assert!(err.is_interceptor());
}

#[tokio::test]
async fn test_timeout_recovered_by_interceptor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let registry = InterceptorRegistry::new();
    let client = HyperClient::builder()
        .timeout(Duration::from_millis(100))
        .with_interceptors(registry.clone())
        .build();
    let target = url(&mock_server, "/slow");

    let err = client.get(target.as_str()).await.expect_err("timeout");
    assert!(err.is_timeout());

    let _fallback = registry.register(Arc::new(FnInterceptor::new().on_response_error(
        |error| async move {
            if error.is_timeout() {
                Ok(hookwire::Response::new(
                    204,
                    std::collections::HashMap::new(),
                    bytes::Bytes::new(),
                ))
            } else {
                Err(error)
            }
        },
    )));

    let response = client.get(target.as_str()).await.expect("recovered");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_connection_error() {
    let registry = InterceptorRegistry::new();
    let _logging = registry.register(Arc::new(LoggingInterceptor::new()));
    let client = HyperClient::builder()
        .connect_timeout(Duration::from_millis(100))
        .with_interceptors(registry)
        .build();

    let err = client
        .get("http://127.0.0.1:1/unreachable")
        .await
        .expect_err("connection refused");
    assert!(err.is_connection(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_default_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agent"))
        .and(header("User-Agent", hookwire::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let response = client
        .get(url(&mock_server, "/agent").as_str())
        .await
        .expect("response");
    assert!(response.is_success());
}

#[tokio::test]
async fn test_environment_attach_on_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/3"))
        .and(header_exists("X-Attached"))
        .respond_with(ResponseTemplate::new(200).set_body_json(User {
            id: 3,
            name: "Carol".to_string(),
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let env = Environment::new(Host::Server).with_client(HyperClient::new());
    let registry = env.registry().clone();
    let client = env.attach().expect("attached");
    let _attached = registry.register(tag("X-Attached", "1"));

    let response = client
        .put_json(
            url(&mock_server, "/users/3").as_str(),
            &User {
                id: 3,
                name: "Carol".to_string(),
            },
        )
        .await
        .expect("response");

    let user: User = response.json().expect("json");
    assert_eq!(user.name, "Carol");
}
