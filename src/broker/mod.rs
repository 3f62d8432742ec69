//! Identity Broker
//!
//! Reconciles a [`CanonicalProfile`] with the identity platform's user
//! record and mints a federated token for it.
//!
//! Per request: lookup, then create when no record exists, or refresh the
//! record when the provider asks for it, then mint. The external id is the
//! federated uid unchanged, so repeating a request for the same profile
//! never creates a second user. Losing a create race to a concurrent
//! request for the same uid is treated like finding the user on lookup.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::FederationError;
use crate::platform::IdentityPlatform;
use crate::types::{CanonicalProfile, FederatedToken, UserToCreate, UserToUpdate};

/// Get-or-create-or-update broker over an [`IdentityPlatform`].
#[derive(Clone)]
pub struct IdentityBroker {
    platform: Arc<dyn IdentityPlatform>,
}

impl IdentityBroker {
    pub fn new(platform: Arc<dyn IdentityPlatform>) -> Self {
        Self { platform }
    }

    /// Ensure a user record exists for `profile` and mint a token for it.
    ///
    /// When `refresh_existing` is set, an existing record gets its display
    /// name and photo overwritten; failure of that update is logged and
    /// does not fail the request.
    pub async fn federate(
        &self,
        profile: &CanonicalProfile,
        refresh_existing: bool,
    ) -> Result<FederatedToken, FederationError> {
        let uid = profile.external_id.as_str();

        match self.platform.get_user(uid).await {
            Ok(_) => {
                if refresh_existing {
                    self.refresh(uid, profile).await;
                }
            }
            Err(e) if e.is_user_not_found() => {
                match self.platform.create_user(UserToCreate::from(profile)).await {
                    Ok(_) => info!(uid, "created federated user"),
                    // A concurrent request created the record between lookup and create.
                    Err(e) if e.is_user_exists() => {
                        info!(uid, "federated user created concurrently");
                        if refresh_existing {
                            self.refresh(uid, profile).await;
                        }
                    }
                    Err(e) => {
                        error!(uid, error = %e, "failed to create federated user");
                        return Err(FederationError::Create(e));
                    }
                }
            }
            Err(e) => {
                error!(uid, error = %e, "failed to look up federated user");
                return Err(FederationError::Lookup(e));
            }
        }

        self.platform.mint_token(uid).await.map_err(|e| {
            error!(uid, error = %e, "failed to mint federated token");
            FederationError::Mint(e)
        })
    }

    async fn refresh(&self, uid: &str, profile: &CanonicalProfile) {
        let update = UserToUpdate::from(profile);
        if update.is_empty() {
            return;
        }

        match self.platform.update_user(uid, update).await {
            Ok(_) => info!(uid, "updated federated user"),
            Err(e) => warn!(uid, error = %e, "failed to update federated user"),
        }
    }
}
