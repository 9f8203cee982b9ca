//! # Database Operations
//!
//! PostgreSQL pool construction and schema migrations.
//!
//! - [`connection`] - Pool creation from [`crate::config::DatabaseConfig`] and health checks
//! - [`migrations`] - Versioned SQL migrations embedded from `migrations/`

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
