//! Canonical Profile
//!
//! Provider-neutral user profile produced by the profile adapters.

use serde::Serialize;

/// Normalized user profile. `external_id` becomes the federated uid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalProfile {
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
}

impl CanonicalProfile {
    /// Create a profile with only an external id.
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            ..Default::default()
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = photo_url.into();
        self
    }
}

/// Returns `primary` unless it is empty, in which case `fallback`.
pub(crate) fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .filter(|v| !v.is_empty())
        .or(fallback)
        .unwrap_or_default()
}
