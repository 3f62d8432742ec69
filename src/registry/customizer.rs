//! Token Request Customizers
//!
//! Per-provider adjustments to the outgoing authorization-code token request.

use base64::Engine;
use secrecy::ExposeSecret;

use crate::core::{FormParams, HttpRequest};
use crate::types::ResolvedExchange;

/// How client credentials reach the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
    /// client_id and client_secret in request body.
    #[default]
    ClientSecretPost,
    /// HTTP Basic Authentication header.
    ClientSecretBasic,
}

/// Token request shaping for one provider.
///
/// Applied to a per-request copy of the request and form; holds no state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestCustomizer {
    accept_json: bool,
    client_id_param: &'static str,
    auth_method: ClientAuthMethod,
    scope: Option<&'static str>,
    forward_code_verifier: bool,
}

impl Default for RequestCustomizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl RequestCustomizer {
    /// Plain RFC 6749 form post; no adjustments.
    pub const fn standard() -> Self {
        Self {
            accept_json: false,
            client_id_param: "client_id",
            auth_method: ClientAuthMethod::ClientSecretPost,
            scope: None,
            forward_code_verifier: false,
        }
    }

    /// Force `Accept: application/json`.
    pub const fn accept_json(mut self) -> Self {
        self.accept_json = true;
        self
    }

    /// Send the client id under a different form key.
    pub const fn client_id_param(mut self, name: &'static str) -> Self {
        self.client_id_param = name;
        self
    }

    /// Move credentials into an HTTP Basic header.
    pub const fn basic_auth(mut self) -> Self {
        self.auth_method = ClientAuthMethod::ClientSecretBasic;
        self
    }

    /// Add a fixed `scope` field.
    pub const fn scope(mut self, scope: &'static str) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Forward the PKCE `code_verifier` when the caller supplied one.
    pub const fn pkce(mut self) -> Self {
        self.forward_code_verifier = true;
        self
    }

    pub fn auth_method(&self) -> ClientAuthMethod {
        self.auth_method
    }

    /// Adjust the token request in place.
    pub fn apply(&self, request: &mut HttpRequest, form: &mut FormParams, inputs: &ResolvedExchange) {
        if self.accept_json {
            request.set_header("accept", "application/json");
        }

        if self.client_id_param != "client_id" {
            if let Some(client_id) = form.remove("client_id") {
                form.set(self.client_id_param, client_id);
            }
        }

        if self.auth_method == ClientAuthMethod::ClientSecretBasic {
            let credentials = format!(
                "{}:{}",
                inputs.client_id,
                inputs.client_secret.expose_secret()
            );
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            request.set_header("authorization", format!("Basic {}", encoded));
            form.remove("client_id");
            form.remove("client_secret");
        }

        if let Some(scope) = self.scope {
            form.set("scope", scope);
        }

        if self.forward_code_verifier {
            if let Some(verifier) = &inputs.code_verifier {
                form.set("code_verifier", verifier.as_str());
            }
        }
    }
}
