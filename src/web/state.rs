//! # Web API Application State

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::config::FoodgramConfig;
use crate::services::MediaStore;

/// Shared application state for the web API
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FoodgramConfig>,

    /// Database pool shared by all handlers
    pub db_pool: PgPool,

    /// Uploaded image storage
    pub media: MediaStore,
}

impl AppState {
    pub fn new(config: FoodgramConfig, db_pool: PgPool) -> Self {
        let media = MediaStore::from_config(&config.media);

        info!(
            pool_size = db_pool.size(),
            media_root = %media.root().display(),
            page_size = config.pagination.page_size,
            "Web API application state created"
        );

        Self {
            config: Arc::new(config),
            db_pool,
            media,
        }
    }
}
