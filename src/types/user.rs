//! Federated User Types
//!
//! Records and attribute sets exchanged with the identity platform.

use serde::{Deserialize, Serialize};

use super::CanonicalProfile;
use crate::error::ClientError;

/// User record owned by the identity platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedUser {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Attributes for a new user record. Empty attributes are left unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserToCreate {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<&CanonicalProfile> for UserToCreate {
    fn from(profile: &CanonicalProfile) -> Self {
        Self {
            uid: profile.external_id.clone(),
            display_name: present(&profile.display_name),
            email: present(&profile.email),
            photo_url: present(&profile.photo_url),
        }
    }
}

/// Attributes refreshed on an existing record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserToUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl UserToUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

impl From<&CanonicalProfile> for UserToUpdate {
    fn from(profile: &CanonicalProfile) -> Self {
        Self {
            display_name: present(&profile.display_name),
            photo_url: present(&profile.photo_url),
        }
    }
}

fn present(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Identity endpoint request body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl FederationRequest {
    /// The provider access token, required and non-empty.
    pub fn into_access_token(self) -> Result<String, ClientError> {
        self.access_token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingParameter {
                field: "accessToken",
            })
    }
}

/// Signed, short-lived credential minted by the identity platform.
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedToken(String);

impl FederatedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for FederatedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FederatedToken([REDACTED])")
    }
}

/// Identity endpoint success payload.
#[derive(Debug, Serialize)]
pub struct FederatedTokenResponse {
    pub firebase_token: String,
}

impl From<FederatedToken> for FederatedTokenResponse {
    fn from(token: FederatedToken) -> Self {
        Self {
            firebase_token: token.into_inner(),
        }
    }
}
