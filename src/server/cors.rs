//! CORS handling.
//!
//! Preflight requests are answered here without reaching a handler, on any
//! path. Every response gets the CORS header set; the origin is echoed only
//! on an exact allow-list match.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use super::AppState;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

pub async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut(), origin.as_ref(), &state.allowed_origins);
    response
}

/// Set the CORS headers for a request from `origin`.
pub fn apply_cors_headers(
    headers: &mut HeaderMap,
    origin: Option<&HeaderValue>,
    allowed_origins: &[String],
) {
    if let Some(origin) = origin {
        let allowed = origin
            .to_str()
            .map(|o| allowed_origins.iter().any(|a| a == o))
            .unwrap_or(false);
        if allowed {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}
