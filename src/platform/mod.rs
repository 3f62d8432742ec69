//! Identity Platform
//!
//! The managed user store and token-signing service that federated
//! identities are reconciled against.

pub mod firebase;
pub mod memory;
pub mod mock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{FederatedToken, FederatedUser, UserToCreate, UserToUpdate};

pub use firebase::{FirebaseIdentityPlatform, ServiceAccountKey};
pub use memory::InMemoryIdentityPlatform;
pub use mock::{MockIdentityPlatform, PlatformCall};

/// Lifetime of minted federated tokens, in seconds.
pub const FEDERATED_TOKEN_LIFETIME_SECS: i64 = 3600;

/// User store and token minting (for dependency injection).
#[async_trait]
pub trait IdentityPlatform: Send + Sync {
    /// Look up a user by uid. A missing record is [`StoreError::UserNotFound`].
    async fn get_user(&self, uid: &str) -> Result<FederatedUser, StoreError>;

    /// Create a user with the given uid and attributes.
    async fn create_user(&self, user: UserToCreate) -> Result<FederatedUser, StoreError>;

    /// Overwrite display name and photo of an existing user.
    async fn update_user(&self, uid: &str, update: UserToUpdate) -> Result<FederatedUser, StoreError>;

    /// Sign a short-lived token bound to `uid`.
    async fn mint_token(&self, uid: &str) -> Result<FederatedToken, StoreError>;
}
