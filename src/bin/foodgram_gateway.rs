//! # Foodgram Gateway
//!
//! Front door of the deployment: proxies API traffic to the backend, serves
//! uploaded media and the built frontend.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use foodgram::config::ConfigLoader;
use foodgram::gateway::{create_gateway_app, GatewayState};
use foodgram::logging::init_logging;
use foodgram::server::shutdown_signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    ConfigLoader::load_env_file();
    init_logging("foodgram-gateway");

    let config = ConfigLoader::load_from_env().context("failed to load configuration")?;
    let gateway = config.gateway;

    let state = GatewayState::from_config(&gateway).context("invalid gateway routing table")?;
    let app = create_gateway_app(state);

    let listener = tokio::net::TcpListener::bind(&gateway.bind_address)
        .await
        .with_context(|| format!("cannot bind {}", gateway.bind_address))?;

    info!(bind_address = %gateway.bind_address, "Foodgram gateway listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("gateway terminated with an error")?;

    info!("Foodgram gateway stopped");
    Ok(())
}
