//! Firebase Authentication
//!
//! Identity platform backed by the Identity Toolkit REST API. Admin calls
//! are authorized with an OAuth2 access token obtained through the
//! service-account JWT-bearer grant; federated tokens are Firebase custom
//! tokens signed with the service-account key.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{IdentityPlatform, FEDERATED_TOKEN_LIFETIME_SECS};
use crate::config::ConfigError;
use crate::core::{FormParams, HttpRequest, HttpTransport};
use crate::error::StoreError;
use crate::types::{FederatedToken, FederatedUser, UserToCreate, UserToUpdate};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Audience of Firebase custom tokens.
pub const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

const ADMIN_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/identitytoolkit",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;
const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 300;

/// Google service-account key file.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: SecretString,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load a key file as downloaded from the Google Cloud console.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::ServiceAccount {
            path: path.display().to_string(),
            message,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
    }
}

/// Cached admin access token.
#[derive(Clone)]
struct AdminToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl AdminToken {
    fn needs_refresh(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS)
    }
}

/// Firebase Authentication over the Identity Toolkit REST API.
pub struct FirebaseIdentityPlatform {
    transport: Arc<dyn HttpTransport>,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    base_url: String,
    token_url: String,
    cached_token: RwLock<Option<AdminToken>>,
}

impl FirebaseIdentityPlatform {
    /// Create a platform client. Fails when the private key is not RSA PEM.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        key: ServiceAccountKey,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| ConfigError::ServiceAccount {
                path: key.client_email.clone(),
                message: format!("invalid private key: {}", e),
            })?;

        Ok(Self {
            transport,
            token_url: key.token_uri.clone(),
            key,
            signing_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cached_token: RwLock::new(None),
        })
    }

    /// Override the OAuth2 token endpoint used for admin credentials.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    fn create_assertion(&self) -> Result<String, StoreError> {
        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: String,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: ADMIN_SCOPES.join(" "),
            aud: &self.token_url,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.signing_key).map_err(|e| StoreError::Signing {
            message: format!("assertion encoding failed: {}", e),
        })
    }

    async fn exchange_assertion(&self) -> Result<AdminToken, StoreError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let assertion = self.create_assertion()?;
        let form: FormParams = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ]
        .into_iter()
        .collect();

        let mut request = HttpRequest::post(self.token_url.clone())
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "application/json");
        request.body = Some(form.encode());

        debug!(token_url = %self.token_url, "requesting identity platform admin token");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(StoreError::Rejected {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        let token: TokenResponse =
            serde_json::from_slice(&response.body).map_err(|e| StoreError::InvalidResponse {
                message: format!("admin token response: {}", e),
            })?;

        Ok(AdminToken {
            token: SecretString::new(token.access_token),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }

    async fn admin_token(&self) -> Result<SecretString, StoreError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.needs_refresh() {
                    return Ok(token.token.clone());
                }
            }
        }

        let fresh = self.exchange_assertion().await?;
        let token = fresh.token.clone();
        *self.cached_token.write().await = Some(fresh);
        Ok(token)
    }

    async fn call<B, T>(&self, operation: &str, uid: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| StoreError::InvalidResponse {
            message: e.to_string(),
        })?;
        let token = self.admin_token().await?;

        let url = format!(
            "{}/v1/projects/{}/{}",
            self.base_url, self.key.project_id, operation
        );
        let request = HttpRequest::post(url)
            .bearer_auth(token.expose_secret())
            .json_body(&body);

        debug!(operation, uid, "identity toolkit call");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(api_error(response.status, &response.body, uid));
        }

        serde_json::from_slice(&response.body).map_err(|e| StoreError::InvalidResponse {
            message: format!("{}: {}", operation, e),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    #[serde(default)]
    local_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

impl UserInfo {
    fn into_user(self, uid: &str) -> FederatedUser {
        FederatedUser {
            uid: if self.local_id.is_empty() {
                uid.to_string()
            } else {
                self.local_id
            },
            display_name: self.display_name,
            email: self.email,
            photo_url: self.photo_url,
        }
    }
}

/// Map an Identity Toolkit error body (`{"error": {"message": "CODE : detail"}}`).
fn api_error(status: u16, body: &[u8], uid: &str) -> StoreError {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: String,
    }

    let message = serde_json::from_slice::<Envelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
    let code = message
        .split(|c: char| c == ' ' || c == ':')
        .next()
        .unwrap_or_default();

    match code {
        "USER_NOT_FOUND" => StoreError::UserNotFound { uid: uid.to_string() },
        "DUPLICATE_LOCAL_ID" => StoreError::UserExists { uid: uid.to_string() },
        _ => StoreError::Rejected { status, message },
    }
}

#[async_trait]
impl IdentityPlatform for FirebaseIdentityPlatform {
    async fn get_user(&self, uid: &str) -> Result<FederatedUser, StoreError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LookupRequest<'a> {
            local_id: [&'a str; 1],
        }

        #[derive(Deserialize)]
        struct LookupResponse {
            #[serde(default)]
            users: Vec<UserInfo>,
        }

        let response: LookupResponse = self
            .call("accounts:lookup", uid, &LookupRequest { local_id: [uid] })
            .await?;

        response
            .users
            .into_iter()
            .next()
            .map(|info| info.into_user(uid))
            .ok_or_else(|| StoreError::UserNotFound { uid: uid.to_string() })
    }

    async fn create_user(&self, user: UserToCreate) -> Result<FederatedUser, StoreError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SignUpRequest<'a> {
            local_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            display_name: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            email: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            photo_url: Option<&'a str>,
        }

        let request = SignUpRequest {
            local_id: &user.uid,
            display_name: user.display_name.as_deref(),
            email: user.email.as_deref(),
            photo_url: user.photo_url.as_deref(),
        };
        let _: serde_json::Value = self.call("accounts", &user.uid, &request).await?;

        Ok(FederatedUser {
            uid: user.uid,
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
        })
    }

    async fn update_user(&self, uid: &str, update: UserToUpdate) -> Result<FederatedUser, StoreError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct UpdateRequest<'a> {
            local_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            display_name: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            photo_url: Option<&'a str>,
        }

        let request = UpdateRequest {
            local_id: uid,
            display_name: update.display_name.as_deref(),
            photo_url: update.photo_url.as_deref(),
        };
        let info: UserInfo = self.call("accounts:update", uid, &request).await?;
        Ok(info.into_user(uid))
    }

    async fn mint_token(&self, uid: &str) -> Result<FederatedToken, StoreError> {
        #[derive(Serialize)]
        struct CustomTokenClaims<'a> {
            iss: &'a str,
            sub: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
            uid: &'a str,
        }

        let now = Utc::now().timestamp();
        let claims = CustomTokenClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            aud: CUSTOM_TOKEN_AUDIENCE,
            iat: now,
            exp: now + FEDERATED_TOKEN_LIFETIME_SECS,
            uid,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map(FederatedToken::new)
            .map_err(|e| StoreError::Signing {
                message: e.to_string(),
            })
    }
}
