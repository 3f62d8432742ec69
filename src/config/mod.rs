//! Gateway Configuration
//!
//! Process configuration read once at start-up from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `ALLOWED_ORIGINS` | comma-separated CORS allow-list (required) |
//! | `OAUTH_CLIENT_ID_<P>` / `OAUTH_CLIENT_SECRET_<P>` | per-provider client credentials |
//! | `MICROSOFT_TENANT_ID` | Microsoft tenant, default `common` |
//! | `PORT` | listen port, default 8080 |
//! | `UPSTREAM_TIMEOUT_SECS` | timeout for every outbound call, default 30 |
//! | `IDENTITY_PLATFORM` | `firebase` (default) or `memory` |
//! | `GOOGLE_APPLICATION_CREDENTIALS` | service-account JSON path (firebase) |
//! | `FIREBASE_AUTH_BASE_URL` | Identity Toolkit base URL (firebase) |
//! | `LOCAL_SIGNING_SECRET` | HS256 secret (memory) |

use secrecy::SecretString;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::error::TransportError;

/// Provider keys and the suffix of their credential variables.
pub const PROVIDER_CREDENTIAL_ENV: &[(&str, &str)] = &[
    ("facebook", "FACEBOOK"),
    ("github", "GITHUB"),
    ("google", "GOOGLE"),
    ("instagram", "INSTAGRAM"),
    ("linkedin", "LINKEDIN"),
    ("microsoft", "MICROSOFT"),
    ("tiktok", "TIKTOK"),
    ("x_twitter", "X_TWITTER"),
];

pub const DEFAULT_MICROSOFT_TENANT: &str = "common";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} environment variable is not set")]
    MissingVariable { name: &'static str },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error("Invalid service account credentials at {path}: {message}")]
    ServiceAccount { path: String, message: String },

    #[error(transparent)]
    HttpClient(#[from] TransportError),
}

/// Client id/secret pair sourced from the environment.
#[derive(Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientSecrets {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// Empty credentials; exchange requests must then supply their own.
    pub fn empty() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Identity platform selection.
#[derive(Clone, Debug)]
pub enum PlatformConfig {
    /// Firebase Authentication via the Identity Toolkit REST API.
    Firebase {
        credentials_path: PathBuf,
        auth_base_url: String,
    },
    /// Process-local store minting HS256 tokens.
    Memory { signing_secret: SecretString },
}

/// Gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Exact-match CORS origins.
    pub allowed_origins: Vec<String>,
    /// Client credentials keyed by provider key.
    pub credentials: HashMap<String, ClientSecrets>,
    /// Tenant used in the Microsoft token endpoint.
    pub microsoft_tenant: String,
    /// Listen port.
    pub port: u16,
    /// Timeout applied to every outbound call.
    pub upstream_timeout: Duration,
    /// Identity platform backend.
    pub platform: PlatformConfig,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .ok_or(ConfigError::MissingVariable {
                name: "ALLOWED_ORIGINS",
            })?;

        let credentials = PROVIDER_CREDENTIAL_ENV
            .iter()
            .map(|(key, suffix)| {
                let id = var(format!("OAUTH_CLIENT_ID_{}", suffix).as_str()).unwrap_or_default();
                let secret = var(format!("OAUTH_CLIENT_SECRET_{}", suffix).as_str()).unwrap_or_default();
                (key.to_string(), ClientSecrets::new(id, secret))
            })
            .collect();

        let microsoft_tenant =
            var("MICROSOFT_TENANT_ID").unwrap_or_else(|| DEFAULT_MICROSOFT_TENANT.to_string());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                name: "PORT",
                message: format!("{}", e),
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                name: "UPSTREAM_TIMEOUT_SECS",
                message: format!("{}", e),
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let platform = match var("IDENTITY_PLATFORM").as_deref().map(str::trim) {
            None | Some("firebase") => PlatformConfig::Firebase {
                credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS")
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingVariable {
                        name: "GOOGLE_APPLICATION_CREDENTIALS",
                    })?,
                auth_base_url: var("FIREBASE_AUTH_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FIREBASE_AUTH_BASE_URL.to_string()),
            },
            Some("memory") => PlatformConfig::Memory {
                signing_secret: var("LOCAL_SIGNING_SECRET")
                    .map(SecretString::new)
                    .ok_or(ConfigError::MissingVariable {
                        name: "LOCAL_SIGNING_SECRET",
                    })?,
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "IDENTITY_PLATFORM",
                    message: format!("expected 'firebase' or 'memory', got '{}'", other),
                })
            }
        };

        Ok(Self {
            allowed_origins,
            credentials,
            microsoft_tenant,
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
            platform,
        })
    }

    /// Credentials for a provider, empty when unconfigured.
    pub fn credentials_for(&self, provider: &str) -> ClientSecrets {
        self.credentials
            .get(provider)
            .cloned()
            .unwrap_or_else(ClientSecrets::empty)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_missing_origins_is_fatal() {
        let err = GatewayConfig::from_lookup(lookup(&[("LOCAL_SIGNING_SECRET", "s")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: "ALLOWED_ORIGINS"
            }
        ));
    }

    #[test]
    fn test_origins_are_trimmed() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("ALLOWED_ORIGINS", " https://app.example , https://admin.example,"),
            ("IDENTITY_PLATFORM", "memory"),
            ("LOCAL_SIGNING_SECRET", "s"),
        ]))
        .unwrap();

        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example", "https://admin.example"]
        );
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("ALLOWED_ORIGINS", "https://app.example"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/sa.json"),
        ]))
        .unwrap();

        assert_eq!(config.microsoft_tenant, "common");
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        match config.platform {
            PlatformConfig::Firebase {
                credentials_path,
                auth_base_url,
            } => {
                assert_eq!(credentials_path, PathBuf::from("/secrets/sa.json"));
                assert_eq!(auth_base_url, DEFAULT_FIREBASE_AUTH_BASE_URL);
            }
            other => panic!("unexpected platform: {:?}", other),
        }
    }

    #[test]
    fn test_missing_provider_credentials_are_empty() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("ALLOWED_ORIGINS", "https://app.example"),
            ("IDENTITY_PLATFORM", "memory"),
            ("LOCAL_SIGNING_SECRET", "s"),
            ("OAUTH_CLIENT_ID_GITHUB", "gh-id"),
            ("OAUTH_CLIENT_SECRET_GITHUB", "gh-secret"),
        ]))
        .unwrap();

        let github = config.credentials_for("github");
        assert_eq!(github.client_id, "gh-id");
        assert_eq!(github.client_secret.expose_secret(), "gh-secret");

        let tiktok = config.credentials_for("tiktok");
        assert!(tiktok.client_id.is_empty());
        assert!(tiktok.client_secret.expose_secret().is_empty());

        assert!(config.credentials.contains_key("x_twitter"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("ALLOWED_ORIGINS", "https://app.example"),
            ("IDENTITY_PLATFORM", "memory"),
            ("LOCAL_SIGNING_SECRET", "s"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = GatewayConfig::from_lookup(lookup(&[
            ("ALLOWED_ORIGINS", "https://app.example"),
            ("IDENTITY_PLATFORM", "ldap"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "IDENTITY_PLATFORM",
                ..
            }
        ));
    }
}
