use std::net::SocketAddr;

use anyhow::Context;
use federation_gateway::telemetry::{init_tracing, LogFormat};
use federation_gateway::{app_router, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).context("failed to initialize gateway")?;

    tracing::info!(
        exchange_providers = ?state.registry.token_provider_keys(),
        identity_providers = ?state.registry.profile_adapter_keys(),
        allowed_origins = config.allowed_origins.len(),
        "providers registered"
    );

    let app = app_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("federation gateway listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
