//! HTTP Transport
//!
//! Outbound HTTP interface used for provider token endpoints, provider
//! profile endpoints and the identity platform.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

/// Default cap on buffered upstream response bodies.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1_048_576;

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers, keys lowercased.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a GET request with no headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a POST request with no headers or body.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header in place.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Look up a header by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set `Authorization: Bearer <token>`.
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {}", token))
    }

    /// Set a JSON body and content type.
    pub fn json_body(mut self, body: &serde_json::Value) -> Self {
        self.set_header("content-type", "application/json");
        self.body = Some(body.to_string());
        self
    }
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Build a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response with a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestHttpTransport {
    /// Create new transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_options(Duration::from_secs(30), DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create transport with custom options.
    pub fn with_options(timeout: Duration, max_response_size: usize) -> Result<Self, TransportError> {
        // Redirects are relayed to the caller, never followed.
        let client = reqwest::Client::builder()
            .user_agent(concat!("federation-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        debug!(method = request.method.as_str(), url = %request.url, "sending upstream request");

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder = req_builder.timeout(timeout);

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { timeout }
            } else {
                TransportError::ConnectionFailed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(TransportError::ResponseTooLarge { size: len as usize });
            }
        }

        let body = response.bytes().await.map_err(|e| TransportError::ReadFailed {
            message: e.to_string(),
        })?;

        if body.len() > self.max_response_size {
            return Err(TransportError::ResponseTooLarge { size: body.len() });
        }

        debug!(status, bytes = body.len(), "upstream response received");

        Ok(HttpResponse { status, body })
    }
}

/// Mock HTTP transport for testing.
///
/// Responses are served in the order they were queued; once the queue is
/// drained the default response (if any) is returned.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    request_history: Mutex<Vec<HttpRequest>>,
    default_response: Mutex<Option<HttpResponse>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.lock_responses().push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.queue_response(HttpResponse::json(status, body))
    }

    /// Queue a transport failure.
    pub fn queue_failure(&self, error: TransportError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Set default response when queue is empty.
    pub fn set_default_response(&self, response: HttpResponse) -> &Self {
        *self
            .default_response
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(response);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.lock_history().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.lock_history().last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.lock_history().len()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<HttpResponse, TransportError>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, Vec<HttpRequest>> {
        self.request_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.lock_history().push(request);

        if let Some(queued) = self.lock_responses().pop_front() {
            return queued;
        }

        self.default_response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| TransportError::ConnectionFailed {
                message: "No mock response available".to_string(),
            })
    }
}
