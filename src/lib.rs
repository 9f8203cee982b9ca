#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Foodgram
//!
//! Recipe-sharing site backend and the HTTP gateway that fronts it.
//!
//! ## Overview
//!
//! Users publish recipes built from a shared ingredient catalogue, tag them,
//! follow other authors, keep favorites and fill a shopping cart whose
//! ingredients can be downloaded as one aggregated list. The gateway sits in
//! front of the API server and the prebuilt frontend and routes by path
//! prefix.
//!
//! ## Module Organization
//!
//! - [`models`] - One module per table, each owning its SQL
//! - [`database`] - Connection pool and embedded migrations
//! - [`services`] - Passwords, media storage, shopping lists, fixtures
//! - [`web`] - REST API router, handlers, extractors and errors
//! - [`gateway`] - Reverse proxy, static files and SPA fallback
//! - [`config`] - TOML configuration with environment substitution
//! - [`logging`] - Structured logging setup
//! - [`error`] - Library error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foodgram::config::ConfigLoader;
//! use foodgram::database::DatabaseConnection;
//! use foodgram::web::{create_app, state::AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load_from_env()?;
//! let db = DatabaseConnection::connect(&config.database).await?;
//! let app = create_app(AppState::new(config, db.into_pool()));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Database tests use `#[sqlx::test]` with a fresh database per test:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests (needs DATABASE_URL)
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod server;
pub mod services;
pub mod web;

pub use config::{ConfigLoader, FoodgramConfig};
pub use error::{FoodgramError, Result};
