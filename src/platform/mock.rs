//! Mock identity platform for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::IdentityPlatform;
use crate::error::StoreError;
use crate::types::{FederatedToken, FederatedUser, UserToCreate, UserToUpdate};

/// A call received by [`MockIdentityPlatform`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformCall {
    GetUser(String),
    CreateUser(UserToCreate),
    UpdateUser(String, UserToUpdate),
    MintToken(String),
}

#[derive(Default)]
struct Failures {
    lookup: Option<StoreError>,
    create: Option<StoreError>,
    update: Option<StoreError>,
    mint: Option<StoreError>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, FederatedUser>,
    calls: Vec<PlatformCall>,
    failures: Failures,
}

/// Mock identity platform.
///
/// Keeps users in memory, records every call, and returns the injected
/// failure (if any) for each operation. Minted tokens are `token-for-<uid>`.
#[derive(Default)]
pub struct MockIdentityPlatform {
    state: Mutex<State>,
}

impl MockIdentityPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing user.
    pub fn with_user(self, user: FederatedUser) -> Self {
        self.lock().users.insert(user.uid.clone(), user);
        self
    }

    /// Fail every lookup with `error`.
    pub fn fail_lookup(&self, error: StoreError) -> &Self {
        self.lock().failures.lookup = Some(error);
        self
    }

    /// Fail every create with `error`.
    pub fn fail_create(&self, error: StoreError) -> &Self {
        self.lock().failures.create = Some(error);
        self
    }

    /// Fail every update with `error`.
    pub fn fail_update(&self, error: StoreError) -> &Self {
        self.lock().failures.update = Some(error);
        self
    }

    /// Fail every mint with `error`.
    pub fn fail_mint(&self, error: StoreError) -> &Self {
        self.lock().failures.mint = Some(error);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.lock().calls.clone()
    }

    /// Stored user, if any.
    pub fn user(&self, uid: &str) -> Option<FederatedUser> {
        self.lock().users.get(uid).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IdentityPlatform for MockIdentityPlatform {
    async fn get_user(&self, uid: &str) -> Result<FederatedUser, StoreError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::GetUser(uid.to_string()));

        if let Some(error) = state.failures.lookup.clone() {
            return Err(error);
        }
        state
            .users
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound { uid: uid.to_string() })
    }

    async fn create_user(&self, user: UserToCreate) -> Result<FederatedUser, StoreError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::CreateUser(user.clone()));

        if let Some(error) = state.failures.create.clone() {
            return Err(error);
        }
        if state.users.contains_key(&user.uid) {
            return Err(StoreError::UserExists { uid: user.uid });
        }

        let record = FederatedUser {
            uid: user.uid.clone(),
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
        };
        state.users.insert(user.uid, record.clone());
        Ok(record)
    }

    async fn update_user(&self, uid: &str, update: UserToUpdate) -> Result<FederatedUser, StoreError> {
        let mut state = self.lock();
        state
            .calls
            .push(PlatformCall::UpdateUser(uid.to_string(), update.clone()));

        if let Some(error) = state.failures.update.clone() {
            return Err(error);
        }
        let record = state
            .users
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
        let mut state = self.lock();
        state.calls.push(PlatformCall::MintToken(uid.to_string()));

        if let Some(error) = state.failures.mint.clone() {
            return Err(error);
        }
        Ok(FederatedToken::new(format!("token-for-{}", uid)))
    }
}
