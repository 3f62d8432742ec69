//! Exchange Types
//!
//! Inbound authorization-code exchange request and its resolved form.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ClientError;

/// Exchange endpoint request body.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExchangeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub code_verifier: Option<String>,
}

impl ExchangeRequest {
    /// Merge with registry credentials and validate required fields.
    ///
    /// Request credentials win when present and non-empty. Fields are checked
    /// in the order code, redirect_uri, client_id, client_secret.
    pub fn resolve(
        self,
        default_client_id: &str,
        default_client_secret: &SecretString,
    ) -> Result<ResolvedExchange, ClientError> {
        let client_id = non_empty(self.client_id).unwrap_or_else(|| default_client_id.to_string());
        let client_secret = non_empty(self.client_secret)
            .unwrap_or_else(|| default_client_secret.expose_secret().clone());

        let code = non_empty(self.code).ok_or(ClientError::MissingParameter { field: "code" })?;
        let redirect_uri = non_empty(self.redirect_uri)
            .ok_or(ClientError::MissingParameter { field: "redirect_uri" })?;
        if client_id.is_empty() {
            return Err(ClientError::MissingParameter { field: "client_id" });
        }
        if client_secret.is_empty() {
            return Err(ClientError::MissingParameter {
                field: "client_secret",
            });
        }

        Ok(ResolvedExchange {
            code,
            redirect_uri,
            client_id,
            client_secret: SecretString::new(client_secret),
            code_verifier: non_empty(self.code_verifier),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Validated exchange inputs handed to the request customizer.
#[derive(Clone)]
pub struct ResolvedExchange {
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub code_verifier: Option<String>,
}

impl std::fmt::Debug for ResolvedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedExchange")
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("code_verifier", &self.code_verifier.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
