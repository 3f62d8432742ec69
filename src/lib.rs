//! Identity-federation gateway.
//!
//! Two HTTP entry points give clients one contract across identity
//! providers:
//!
//! - `POST /exchange/{provider}` trades an authorization code for the
//!   provider's token response, smoothing over token-endpoint quirks.
//! - `POST /token/{provider}` verifies a provider access token, reconciles
//!   the user with the identity platform, and returns a federated token.
//!
//! # Example
//!
//! ```rust,ignore
//! use federation_gateway::{app_router, AppState, GatewayConfig};
//!
//! let config = GatewayConfig::from_env()?;
//! let state = AppState::from_config(&config)?;
//! let app = app_router(state);
//! ```

pub mod broker;
pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod platform;
pub mod profile;
pub mod registry;
pub mod server;
pub mod telemetry;
pub mod types;

pub use broker::IdentityBroker;
pub use config::{ConfigError, GatewayConfig, PlatformConfig};
pub use error::{GatewayError, GatewayResult};
pub use exchange::ExchangeProxy;
pub use platform::IdentityPlatform;
pub use profile::{ProfileAdapter, ProfileProvider};
pub use registry::{ProviderConfig, ProviderRegistry, RequestCustomizer};
pub use server::{app_router, AppState};
