//! Profile Adapters
//!
//! Resolve a provider access token to a [`CanonicalProfile`] by calling the
//! provider's "who am I" endpoint and mapping its JSON shape.
//!
//! The provider set is closed: each variant of [`ProfileProvider`] names its
//! endpoint, how the token is presented, and a mapping function in its own
//! submodule.

mod facebook;
mod github;
mod instagram;
mod linkedin;
mod microsoft;
mod tiktok;
mod x;

use tracing::{debug, warn};
use url::Url;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{ProfileError, TransportError};
use crate::types::CanonicalProfile;

/// How the access token is presented to the profile endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `Authorization: Bearer <token>`.
    BearerHeader,
    /// `access_token=<token>` query parameter.
    QueryParameter,
}

/// Supported profile providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileProvider {
    GitHub,
    Facebook,
    Instagram,
    LinkedIn,
    Microsoft,
    TikTok,
    X,
}

impl ProfileProvider {
    pub const ALL: &'static [ProfileProvider] = &[
        Self::GitHub,
        Self::Facebook,
        Self::Instagram,
        Self::LinkedIn,
        Self::Microsoft,
        Self::TikTok,
        Self::X,
    ];

    /// Path key, shared with the exchange endpoint.
    pub fn key(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::LinkedIn => "linkedin",
            Self::Microsoft => "microsoft",
            Self::TikTok => "tiktok",
            Self::X => "x_twitter",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::LinkedIn => "LinkedIn",
            Self::Microsoft => "Microsoft",
            Self::TikTok => "TikTok",
            Self::X => "X",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::GitHub => github::ENDPOINT,
            Self::Facebook => facebook::ENDPOINT,
            Self::Instagram => instagram::ENDPOINT,
            Self::LinkedIn => linkedin::ENDPOINT,
            Self::Microsoft => microsoft::ENDPOINT,
            Self::TikTok => tiktok::ENDPOINT,
            Self::X => x::ENDPOINT,
        }
    }

    pub fn token_placement(&self) -> TokenPlacement {
        match self {
            Self::Facebook | Self::Instagram => TokenPlacement::QueryParameter,
            _ => TokenPlacement::BearerHeader,
        }
    }

    /// Whether an existing federated user gets display name and photo refreshed.
    pub fn refresh_existing(&self) -> bool {
        matches!(self, Self::GitHub)
    }

    fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::GitHub => github::HEADERS,
            _ => &[],
        }
    }

    /// Map a profile response body; errors describe the decode failure.
    pub fn parse(&self, body: &[u8]) -> Result<CanonicalProfile, String> {
        let profile = match self {
            Self::GitHub => github::parse(body),
            Self::Facebook => facebook::parse(body),
            Self::Instagram => instagram::parse(body),
            Self::LinkedIn => linkedin::parse(body),
            Self::Microsoft => microsoft::parse(body),
            Self::TikTok => tiktok::parse(body),
            Self::X => x::parse(body),
        }?;

        if profile.external_id.is_empty() {
            return Err("missing user id".to_string());
        }
        Ok(profile)
    }
}

/// A provider bound to a concrete profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileAdapter {
    provider: ProfileProvider,
    endpoint: String,
}

impl ProfileAdapter {
    /// Adapter using the provider's public endpoint.
    pub fn new(provider: ProfileProvider) -> Self {
        Self {
            provider,
            endpoint: provider.default_endpoint().to_string(),
        }
    }

    /// Point the adapter at another endpoint (query string preserved).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn provider(&self) -> ProfileProvider {
        self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn refresh_existing(&self) -> bool {
        self.provider.refresh_existing()
    }

    fn build_request(&self, access_token: &str) -> Result<HttpRequest, TransportError> {
        let request = match self.provider.token_placement() {
            TokenPlacement::BearerHeader => {
                HttpRequest::get(self.endpoint.clone()).bearer_auth(access_token)
            }
            TokenPlacement::QueryParameter => {
                let mut url = Url::parse(&self.endpoint).map_err(|e| TransportError::Client {
                    message: format!("invalid profile endpoint {}: {}", self.endpoint, e),
                })?;
                url.query_pairs_mut().append_pair("access_token", access_token);
                HttpRequest::get(url.to_string())
            }
        };

        Ok(self
            .provider
            .extra_headers()
            .iter()
            .fold(request, |request, (name, value)| request.header(name, *value)))
    }

    /// Fetch and normalize the profile behind `access_token`.
    pub async fn fetch_profile(
        &self,
        transport: &dyn HttpTransport,
        access_token: &str,
    ) -> Result<CanonicalProfile, ProfileError> {
        let provider = self.provider.label();
        let unreachable = |source: TransportError| {
            warn!(provider, error = %source, "profile endpoint unreachable");
            ProfileError::Unreachable { provider, source }
        };

        let request = self.build_request(access_token).map_err(unreachable)?;
        debug!(provider, endpoint = %self.endpoint, "fetching user profile");

        let response = transport.send(request).await.map_err(unreachable)?;

        if !response.is_success() {
            warn!(provider, status = response.status, "profile endpoint rejected token");
            return Err(ProfileError::Rejected {
                provider,
                status: response.status,
            });
        }

        self.provider
            .parse(&response.body)
            .map_err(|message| ProfileError::Parse { provider, message })
    }
}
