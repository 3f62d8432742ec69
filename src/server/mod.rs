//! HTTP Server
//!
//! axum router exposing the exchange and identity endpoints, with CORS and
//! request tracing applied to every response.

pub mod cors;
pub mod handlers;

use axum::routing::{any, get};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::broker::IdentityBroker;
use crate::config::{ConfigError, GatewayConfig, PlatformConfig};
use crate::core::{HttpTransport, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE};
use crate::exchange::ExchangeProxy;
use crate::platform::{
    FirebaseIdentityPlatform, IdentityPlatform, InMemoryIdentityPlatform, ServiceAccountKey,
};
use crate::registry::ProviderRegistry;

/// Shared, read-only request state.
pub struct AppState {
    pub registry: ProviderRegistry,
    pub allowed_origins: Vec<String>,
    pub transport: Arc<dyn HttpTransport>,
    pub exchange: ExchangeProxy,
    pub broker: IdentityBroker,
}

impl AppState {
    pub fn new(
        registry: ProviderRegistry,
        allowed_origins: Vec<String>,
        transport: Arc<dyn HttpTransport>,
        platform: Arc<dyn IdentityPlatform>,
    ) -> Self {
        Self {
            registry,
            allowed_origins,
            exchange: ExchangeProxy::new(transport.clone()),
            transport,
            broker: IdentityBroker::new(platform),
        }
    }

    /// Wire the production transport and configured identity platform.
    pub fn from_config(config: &GatewayConfig) -> Result<Arc<Self>, ConfigError> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestHttpTransport::with_options(
            config.upstream_timeout,
            DEFAULT_MAX_RESPONSE_SIZE,
        )?);

        let platform: Arc<dyn IdentityPlatform> = match &config.platform {
            PlatformConfig::Firebase {
                credentials_path,
                auth_base_url,
            } => {
                let key = ServiceAccountKey::from_file(credentials_path)?;
                Arc::new(FirebaseIdentityPlatform::new(
                    transport.clone(),
                    key,
                    auth_base_url.clone(),
                )?)
            }
            PlatformConfig::Memory { signing_secret } => {
                Arc::new(InMemoryIdentityPlatform::new(signing_secret))
            }
        };

        Ok(Arc::new(Self::new(
            ProviderRegistry::from_config(config),
            config.allowed_origins.clone(),
            transport,
            platform,
        )))
    }
}

/// Build the gateway router.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/exchange/{provider}", any(handlers::exchange))
        .route("/token/{provider}", any(handlers::federate))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
