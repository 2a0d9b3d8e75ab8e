//! Shadow Auth Gateway
//!
//! Serves the authentication API over HTTP. All configuration comes from
//! `SHADOW_AUTH_*` environment variables and is read once at startup.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shadow_auth_gateway::{auth_config_from_env, create_router, GatewayConfig, GatewayState};
use shadow_auth_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shadow_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shadow Auth Gateway");

    let gateway_config = GatewayConfig::from_env()?;
    let auth_config = auth_config_from_env()?;

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        data_dir = %gateway_config.data_dir,
        auth = ?auth_config,
        "Gateway configuration loaded"
    );

    tracing::info!(path = %gateway_config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&gateway_config.data_dir)?);

    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::from_config(store, &auth_config, gateway_config)?;
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
