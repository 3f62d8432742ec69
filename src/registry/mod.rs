//! Provider Registry
//!
//! Immutable lookup table from provider key to token-exchange configuration
//! and profile adapter. Built once during start-up and shared read-only.

pub mod customizer;

use secrecy::SecretString;
use std::collections::HashMap;

use crate::config::{ClientSecrets, GatewayConfig};
use crate::profile::{ProfileAdapter, ProfileProvider};

pub use customizer::{ClientAuthMethod, RequestCustomizer};

/// Token-exchange configuration for one provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Provider key, as it appears in the request path.
    pub key: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Client id from configuration (may be empty).
    pub client_id: String,
    /// Client secret from configuration (may be empty).
    pub client_secret: SecretString,
    /// Request shaping for this provider's token endpoint.
    pub customizer: RequestCustomizer,
}

impl ProviderConfig {
    pub fn new(
        key: impl Into<String>,
        token_endpoint: impl Into<String>,
        secrets: ClientSecrets,
        customizer: RequestCustomizer,
    ) -> Self {
        Self {
            key: key.into(),
            token_endpoint: token_endpoint.into(),
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            customizer,
        }
    }
}

/// Microsoft identity platform token endpoint for a tenant.
pub fn microsoft_token_endpoint(tenant: &str) -> String {
    let tenant = if tenant.is_empty() { "common" } else { tenant };
    format!("https://login.microsoftonline.com/{}/oauth2/v2.0/token", tenant)
}

/// Built-in token endpoint table, excluding tenant-parameterized Microsoft.
const TOKEN_ENDPOINTS: &[(&str, &str, RequestCustomizer)] = &[
    (
        "google",
        "https://oauth2.googleapis.com/token",
        RequestCustomizer::standard().accept_json(),
    ),
    (
        "facebook",
        "https://graph.facebook.com/v19.0/oauth/access_token",
        RequestCustomizer::standard(),
    ),
    (
        "instagram",
        "https://api.instagram.com/oauth/access_token",
        RequestCustomizer::standard(),
    ),
    (
        "linkedin",
        "https://www.linkedin.com/oauth/v2/accessToken",
        RequestCustomizer::standard(),
    ),
    (
        "github",
        "https://github.com/login/oauth/access_token",
        RequestCustomizer::standard().accept_json(),
    ),
    (
        "tiktok",
        "https://open.tiktokapis.com/v2/oauth/token/",
        RequestCustomizer::standard().client_id_param("client_key"),
    ),
    (
        "x_twitter",
        "https://api.twitter.com/2/oauth2/token",
        RequestCustomizer::standard().basic_auth().pkce(),
    ),
];

const MICROSOFT_SCOPE: &str = "openid profile email";

/// Provider lookup table.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    token_providers: HashMap<String, ProviderConfig>,
    profile_adapters: HashMap<String, ProfileAdapter>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the built-in provider set from configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut registry = Self::new();

        for (key, endpoint, customizer) in TOKEN_ENDPOINTS {
            registry = registry.with_token_provider(ProviderConfig::new(
                *key,
                *endpoint,
                config.credentials_for(key),
                customizer.clone(),
            ));
        }

        registry = registry.with_token_provider(ProviderConfig::new(
            "microsoft",
            microsoft_token_endpoint(&config.microsoft_tenant),
            config.credentials_for("microsoft"),
            RequestCustomizer::standard()
                .basic_auth()
                .scope(MICROSOFT_SCOPE)
                .pkce(),
        ));

        for provider in ProfileProvider::ALL {
            registry = registry.with_profile_adapter(ProfileAdapter::new(*provider));
        }

        registry
    }

    /// Add or replace a token-exchange provider.
    pub fn with_token_provider(mut self, provider: ProviderConfig) -> Self {
        self.token_providers.insert(provider.key.clone(), provider);
        self
    }

    /// Add or replace a profile adapter.
    pub fn with_profile_adapter(mut self, adapter: ProfileAdapter) -> Self {
        self.profile_adapters
            .insert(adapter.provider().key().to_string(), adapter);
        self
    }

    /// Exact, case-sensitive lookup of a token-exchange provider.
    pub fn token_provider(&self, key: &str) -> Option<&ProviderConfig> {
        self.token_providers.get(key)
    }

    /// Exact, case-sensitive lookup of a profile adapter.
    pub fn profile_adapter(&self, key: &str) -> Option<&ProfileAdapter> {
        self.profile_adapters.get(key)
    }

    /// Registered token-exchange keys, sorted.
    pub fn token_provider_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.token_providers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Registered profile adapter keys, sorted.
    pub fn profile_adapter_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.profile_adapters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
