//! Exchange Proxy
//!
//! Trades an authorization code for a provider token response. The request
//! is assembled from the caller's body and the provider's registry entry,
//! shaped by the provider's customizer, and the upstream answer is relayed
//! without interpretation.

use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{FormParams, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{ExchangeError, GatewayError};
use crate::registry::ProviderConfig;
use crate::types::{ExchangeRequest, ResolvedExchange};

/// Authorization-code exchange over an [`HttpTransport`].
#[derive(Clone)]
pub struct ExchangeProxy {
    transport: Arc<dyn HttpTransport>,
}

impl ExchangeProxy {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Exchange `request` at `provider`'s token endpoint.
    ///
    /// Validation failures return before anything is sent. The returned
    /// response carries the upstream status and body bytes unchanged.
    pub async fn exchange(
        &self,
        provider: &ProviderConfig,
        request: ExchangeRequest,
    ) -> Result<HttpResponse, GatewayError> {
        let inputs = request.resolve(&provider.client_id, &provider.client_secret)?;
        let token_request = build_token_request(provider, &inputs);

        debug!(
            provider = %provider.key,
            endpoint = %provider.token_endpoint,
            "exchanging authorization code"
        );

        let response = self.transport.send(token_request).await.map_err(|e| {
            warn!(provider = %provider.key, error = %e, "token endpoint call failed");
            ExchangeError::from(e)
        })?;

        if !response.is_success() {
            debug!(
                provider = %provider.key,
                status = response.status,
                "token endpoint returned non-success; relaying"
            );
        }

        Ok(response)
    }
}

/// Build the customized token request for validated inputs.
///
/// The customizer works on values owned by this call; the registry entry
/// is only read.
pub fn build_token_request(provider: &ProviderConfig, inputs: &ResolvedExchange) -> HttpRequest {
    let mut form = FormParams::new();
    form.set("code", inputs.code.as_str());
    form.set("redirect_uri", inputs.redirect_uri.as_str());
    form.set("grant_type", "authorization_code");
    form.set("client_id", inputs.client_id.as_str());
    form.set("client_secret", inputs.client_secret.expose_secret().as_str());

    let mut request = HttpRequest::post(provider.token_endpoint.clone())
        .header("content-type", "application/x-www-form-urlencoded");

    provider.customizer.apply(&mut request, &mut form, inputs);

    request.body = Some(form.encode());
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientSecrets;
    use crate::core::MockHttpTransport;
    use crate::error::{ClientError, TransportError};
    use crate::registry::RequestCustomizer;
    use pretty_assertions::assert_eq;

    fn github() -> ProviderConfig {
        ProviderConfig::new(
            "github",
            "https://github.com/login/oauth/access_token",
            ClientSecrets::new("env-id", "env-secret"),
            RequestCustomizer::standard().accept_json(),
        )
    }

    fn body(json: serde_json::Value) -> ExchangeRequest {
        serde_json::from_value(json).unwrap()
    }

    fn form_of(request: &HttpRequest) -> Vec<(String, String)> {
        serde_urlencoded::from_str(request.body.as_deref().unwrap_or_default()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_code_sends_nothing() {
        let transport = Arc::new(MockHttpTransport::new());
        let proxy = ExchangeProxy::new(transport.clone());

        let err = proxy
            .exchange(&github(), body(serde_json::json!({"redirect_uri": "https://app/cb"})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Client(ClientError::MissingParameter { field: "code" })
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_standard_form_and_defaults() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(200, &serde_json::json!({"access_token": "gho_x"}));
        let proxy = ExchangeProxy::new(transport.clone());

        proxy
            .exchange(
                &github(),
                body(serde_json::json!({"code": "abc", "redirect_uri": "https://app/cb"})),
            )
            .await
            .unwrap();

        let sent = transport.get_last_request().unwrap();
        assert_eq!(sent.url, "https://github.com/login/oauth/access_token");
        assert_eq!(sent.header_value("accept"), Some("application/json"));
        assert_eq!(
            sent.header_value("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            form_of(&sent),
            vec![
                ("code".to_string(), "abc".to_string()),
                ("redirect_uri".to_string(), "https://app/cb".to_string()),
                ("grant_type".to_string(), "authorization_code".to_string()),
                ("client_id".to_string(), "env-id".to_string()),
                ("client_secret".to_string(), "env-secret".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_request_credentials_override_registry() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(200, &serde_json::json!({}));
        let proxy = ExchangeProxy::new(transport.clone());

        proxy
            .exchange(
                &github(),
                body(serde_json::json!({
                    "code": "abc", "redirect_uri": "r",
                    "client_id": "req-id", "client_secret": "req-secret"
                })),
            )
            .await
            .unwrap();

        let form = form_of(&transport.get_last_request().unwrap());
        assert!(form.contains(&("client_id".to_string(), "req-id".to_string())));
        assert!(form.contains(&("client_secret".to_string(), "req-secret".to_string())));
    }

    #[tokio::test]
    async fn test_upstream_response_relayed_verbatim() {
        let raw = "{\"error\":\"bad_verification_code\",  \"error_description\":\"The code passed is incorrect or expired.\"}";
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse::new(400, raw));
        let proxy = ExchangeProxy::new(transport.clone());

        let response = proxy
            .exchange(&github(), body(serde_json::json!({"code": "x", "redirect_uri": "r"})))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(response.body, raw.as_bytes());
    }

    #[tokio::test]
    async fn test_transport_failure_is_bad_gateway() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_failure(TransportError::ConnectionFailed {
            message: "connection refused".into(),
        });
        let proxy = ExchangeProxy::new(transport);

        let err = proxy
            .exchange(&github(), body(serde_json::json!({"code": "x", "redirect_uri": "r"})))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.to_string(),
            "Failed to contact token endpoint: Connection failed: connection refused"
        );
    }

    #[test]
    fn test_customizer_applied_once_and_registry_unchanged() {
        let provider = ProviderConfig::new(
            "tiktok",
            "https://open.tiktokapis.com/v2/oauth/token/",
            ClientSecrets::new("ck", "cs"),
            RequestCustomizer::standard().client_id_param("client_key"),
        );
        let before = provider.customizer.clone();
        let inputs = body(serde_json::json!({"code": "c", "redirect_uri": "r"}))
            .resolve(&provider.client_id, &provider.client_secret)
            .unwrap();

        let first = build_token_request(&provider, &inputs);
        let second = build_token_request(&provider, &inputs);

        assert_eq!(first.body, second.body);
        assert_eq!(provider.customizer, before);
        assert_eq!(provider.client_id, "ck");

        let form = form_of(&first);
        assert_eq!(form.iter().filter(|(k, _)| k == "client_key").count(), 1);
        assert!(!form.iter().any(|(k, _)| k == "client_id"));
    }

    #[test]
    fn test_basic_auth_with_verifier() {
        let provider = ProviderConfig::new(
            "x_twitter",
            "https://api.twitter.com/2/oauth2/token",
            ClientSecrets::new("cid", "csecret"),
            RequestCustomizer::standard().basic_auth().pkce(),
        );
        let inputs = body(serde_json::json!({
            "code": "c", "redirect_uri": "r", "code_verifier": "v123"
        }))
        .resolve(&provider.client_id, &provider.client_secret)
        .unwrap();

        let request = build_token_request(&provider, &inputs);

        assert_eq!(
            request.header_value("authorization"),
            Some("Basic Y2lkOmNzZWNyZXQ=")
        );
        assert_eq!(
            form_of(&request),
            vec![
                ("code".to_string(), "c".to_string()),
                ("redirect_uri".to_string(), "r".to_string()),
                ("grant_type".to_string(), "authorization_code".to_string()),
                ("code_verifier".to_string(), "v123".to_string()),
            ]
        );
    }
}
