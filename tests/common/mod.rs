#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use federation_gateway::core::MockHttpTransport;
use federation_gateway::platform::MockIdentityPlatform;
use federation_gateway::{app_router, AppState, GatewayConfig, ProviderRegistry};

pub const ALLOWED_ORIGIN: &str = "https://app.example";

/// Router over mock upstreams, with github and x_twitter credentials configured.
pub struct TestApp {
    pub router: Router,
    pub transport: Arc<MockHttpTransport>,
    pub platform: Arc<MockIdentityPlatform>,
}

pub fn config() -> GatewayConfig {
    let vars = [
        ("ALLOWED_ORIGINS", ALLOWED_ORIGIN),
        ("OAUTH_CLIENT_ID_GITHUB", "gh-id"),
        ("OAUTH_CLIENT_SECRET_GITHUB", "gh-secret"),
        ("OAUTH_CLIENT_ID_X_TWITTER", "x-id"),
        ("OAUTH_CLIENT_SECRET_X_TWITTER", "x-secret"),
        ("IDENTITY_PLATFORM", "memory"),
        ("LOCAL_SIGNING_SECRET", "test-secret"),
    ];
    GatewayConfig::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    })
    .unwrap()
}

pub fn test_app() -> TestApp {
    test_app_with(MockIdentityPlatform::new())
}

pub fn test_app_with(platform: MockIdentityPlatform) -> TestApp {
    let config = config();
    let transport = Arc::new(MockHttpTransport::new());
    let platform = Arc::new(platform);

    let state = AppState::new(
        ProviderRegistry::from_config(&config),
        config.allowed_origins.clone(),
        transport.clone(),
        platform.clone(),
    );

    TestApp {
        router: app_router(Arc::new(state)),
        transport,
        platform,
    }
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", ALLOWED_ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
