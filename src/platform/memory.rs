//! Process-local identity platform for development.
//!
//! Users live in a map for the lifetime of the process; tokens are HS256
//! JWTs signed with a configured secret.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{IdentityPlatform, FEDERATED_TOKEN_LIFETIME_SECS};
use crate::error::StoreError;
use crate::types::{FederatedToken, FederatedUser, UserToCreate, UserToUpdate};

/// Issuer claim of locally minted tokens.
pub const LOCAL_TOKEN_ISSUER: &str = "federation-gateway";

/// Claims of a locally minted token.
#[derive(Debug, Serialize, Deserialize)]
pub struct LocalTokenClaims {
    pub iss: String,
    pub sub: String,
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

/// In-memory user store with HS256 token minting.
pub struct InMemoryIdentityPlatform {
    users: RwLock<HashMap<String, FederatedUser>>,
    signing_key: EncodingKey,
}

impl InMemoryIdentityPlatform {
    pub fn new(signing_secret: &SecretString) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            signing_key: EncodingKey::from_secret(signing_secret.expose_secret().as_bytes()),
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, FederatedUser>> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, FederatedUser>> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IdentityPlatform for InMemoryIdentityPlatform {
    async fn get_user(&self, uid: &str) -> Result<FederatedUser, StoreError> {
        self.read()
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound { uid: uid.to_string() })
    }

    async fn create_user(&self, user: UserToCreate) -> Result<FederatedUser, StoreError> {
        let mut users = self.write();
        if users.contains_key(&user.uid) {
            return Err(StoreError::UserExists { uid: user.uid });
        }

        let record = FederatedUser {
            uid: user.uid.clone(),
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
        };
        users.insert(user.uid, record.clone());
        Ok(record)
    }

    async fn update_user(&self, uid: &str, update: UserToUpdate) -> Result<FederatedUser, StoreError> {
        let mut users = self.write();
        let record = users
            .get_mut(uid)
            .ok_or_else(|| StoreError::UserNotFound { uid: uid.to_string() })?;

        if update.display_name.is_some() {
            record.display_name = update.display_name;
        }
        if update.photo_url.is_some() {
            record.photo_url = update.photo_url;
        }
        Ok(record.clone())
    }

    async fn mint_token(&self, uid: &str) -> Result<FederatedToken, StoreError> {
        let now = Utc::now().timestamp();
        let claims = LocalTokenClaims {
            iss: LOCAL_TOKEN_ISSUER.to_string(),
            sub: uid.to_string(),
            uid: uid.to_string(),
            iat: now,
            exp: now + FEDERATED_TOKEN_LIFETIME_SECS,
        };

        encode(&Header::default(), &claims, &self.signing_key)
            .map(FederatedToken::new)
            .map_err(|e| StoreError::Signing {
                message: e.to_string(),
            })
    }
}
