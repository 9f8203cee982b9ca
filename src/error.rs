//! # Library Error Types
//!
//! Errors raised below the web layer: models, services, configuration and
//! fixture loading. The web layer converts these into [`crate::web::errors::ApiError`].

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum FoodgramError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl FoodgramError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn media(message: impl Into<String>) -> Self {
        Self::Media(message.into())
    }

    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FoodgramError>;
