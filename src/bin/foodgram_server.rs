//! # Foodgram API Server
//!
//! Serves the REST API and the admin listings on `server.bind_address`.
//! The gateway forwards `/api/`, `/admin/` and `/r/` here.

use anyhow::{Context, Result};
use foodgram::config::ConfigLoader;
use foodgram::database::{DatabaseConnection, DatabaseMigrations};
use foodgram::logging::init_logging;
use foodgram::server::shutdown_signal;
use foodgram::web::{create_app, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    ConfigLoader::load_env_file();
    init_logging("foodgram-server");

    let config = ConfigLoader::load_from_env().context("failed to load configuration")?;

    let db = DatabaseConnection::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    if config.database.run_migrations {
        DatabaseMigrations::run_all(db.pool())
            .await
            .context("failed to apply database migrations")?;
    }

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .with_context(|| format!("cannot create media root {}", config.media.root.display()))?;

    let bind_address = config.server.bind_address.clone();
    let app = create_app(AppState::new(config, db.into_pool()));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("cannot bind {bind_address}"))?;

    info!(bind_address = %bind_address, "Foodgram API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server terminated with an error")?;

    info!("Foodgram API server stopped");
    Ok(())
}
