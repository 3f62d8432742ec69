mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use federation_gateway::core::HttpResponse;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{body_string, post_json, send, test_app, ALLOWED_ORIGIN};

fn form_of(body: Option<&str>) -> Vec<(String, String)> {
    serde_urlencoded::from_str(body.unwrap_or_default()).unwrap()
}

#[tokio::test]
async fn test_exchange_relays_upstream_response() {
    let app = test_app();
    let upstream = r#"{"access_token":"gho_abc","token_type":"bearer","scope":""}"#;
    app.transport.queue_response(HttpResponse::new(200, upstream));

    let response = send(
        &app,
        post_json(
            "/exchange/github",
            r#"{"code": "abc", "redirect_uri": "https://app.example/cb"}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
    assert_eq!(body_string(response).await, upstream);

    let sent = app.transport.get_last_request().unwrap();
    assert_eq!(sent.url, "https://github.com/login/oauth/access_token");
    assert_eq!(sent.header_value("accept"), Some("application/json"));
    let form = form_of(sent.body.as_deref());
    assert!(form.contains(&("client_id".to_string(), "gh-id".to_string())));
    assert!(form.contains(&("grant_type".to_string(), "authorization_code".to_string())));
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let app = test_app();
    let upstream = r#"{"error":"invalid_grant"}"#;
    app.transport.queue_response(HttpResponse::new(400, upstream));

    let response = send(
        &app,
        post_json("/exchange/github", r#"{"code": "stale", "redirect_uri": "r"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, upstream);
}

#[tokio::test]
async fn test_missing_redirect_uri_is_rejected_without_upstream_call() {
    let app = test_app();

    let response = send(&app, post_json("/exchange/github", r#"{"code": "abc"}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_string(response).await,
        "Missing required parameter: redirect_uri"
    );
    assert_eq!(app.transport.request_count(), 0);
}

#[tokio::test]
async fn test_unconfigured_provider_needs_request_credentials() {
    let app = test_app();

    let response = send(
        &app,
        post_json("/exchange/facebook", r#"{"code": "abc", "redirect_uri": "r"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Missing required parameter: client_id");
    assert_eq!(app.transport.request_count(), 0);
}

#[tokio::test]
async fn test_request_credentials_win() {
    let app = test_app();
    app.transport
        .queue_json_response(200, &json!({"access_token": "EAAB"}));

    let response = send(
        &app,
        post_json(
            "/exchange/facebook",
            r#"{"code": "abc", "redirect_uri": "r", "client_id": "fb-app", "client_secret": "fb-secret"}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let form = form_of(app.transport.get_last_request().unwrap().body.as_deref());
    assert!(form.contains(&("client_id".to_string(), "fb-app".to_string())));
    assert!(form.contains(&("client_secret".to_string(), "fb-secret".to_string())));
}

#[tokio::test]
async fn test_x_uses_basic_auth_and_verifier() {
    let app = test_app();
    app.transport.queue_json_response(200, &json!({"access_token": "x"}));

    send(
        &app,
        post_json(
            "/exchange/x_twitter",
            r#"{"code": "c", "redirect_uri": "r", "code_verifier": "challenge-verifier"}"#,
        ),
    )
    .await;

    let sent = app.transport.get_last_request().unwrap();
    assert_eq!(sent.header_value("authorization"), Some("Basic eC1pZDp4LXNlY3JldA=="));
    let form = form_of(sent.body.as_deref());
    assert!(form.contains(&("code_verifier".to_string(), "challenge-verifier".to_string())));
    assert!(!form.iter().any(|(k, _)| k == "client_secret"));
}

#[tokio::test]
async fn test_repeated_requests_are_shaped_identically() {
    let app = test_app();
    app.transport.queue_json_response(200, &json!({}));
    app.transport.queue_json_response(200, &json!({}));

    for _ in 0..2 {
        send(
            &app,
            post_json("/exchange/x_twitter", r#"{"code": "c", "redirect_uri": "r"}"#),
        )
        .await;
    }

    let requests = app.transport.get_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
    assert_eq!(requests[0].headers, requests[1].headers);
}

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let app = test_app();

    let response = send(&app, post_json("/exchange/myspace", "not even json")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.transport.request_count(), 0);
}

#[tokio::test]
async fn test_malformed_body() {
    let app = test_app();

    let response = send(&app, post_json("/exchange/github", "{\"code\": ")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Invalid request body");
}

#[tokio::test]
async fn test_non_post_method() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/exchange/github")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_string(response).await, "Only POST method is allowed");
}

#[tokio::test]
async fn test_unknown_provider_wins_over_method() {
    let app = test_app();

    for uri in ["/exchange/bogus", "/token/google"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
    assert_eq!(app.transport.request_count(), 0);
    assert!(app.platform.calls().is_empty());
}

#[tokio::test]
async fn test_unreachable_token_endpoint() {
    let app = test_app();

    let response = send(
        &app,
        post_json("/exchange/github", r#"{"code": "abc", "redirect_uri": "r"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response)
        .await
        .starts_with("Failed to contact token endpoint"));
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let app = test_app();

    for uri in ["/exchange/github", "/exchange/unknown", "/token/github", "/nowhere"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header("origin", ALLOWED_ORIGIN)
            .body(Body::empty())
            .unwrap();

        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", uri);
        assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(response.headers()["access-control-allow-headers"], "Content-Type");
        assert_eq!(body_string(response).await, "");
    }
    assert_eq!(app.transport.request_count(), 0);
}

#[tokio::test]
async fn test_disallowed_origin_not_echoed() {
    let app = test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/exchange/github")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}
