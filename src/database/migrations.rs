//! # Database Migration System
//!
//! Migrations live in `migrations/` as `YYYYMMDDHHMMSS_description.sql` and are
//! embedded into the binary at compile time. `sqlx` records applied versions in
//! `_sqlx_migrations` and serializes concurrent runs with an advisory lock, so the
//! server and the CLI may both call [`DatabaseMigrations::run_all`] safely.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Apply all outstanding migrations in version order
    pub async fn run_all(pool: &PgPool) -> Result<(), MigrateError> {
        let known = MIGRATOR.iter().count();
        info!(known_migrations = known, "Running database migrations");

        MIGRATOR.run(pool).await?;

        info!("Database schema is up to date");
        Ok(())
    }

    /// Versions of the embedded migrations, oldest first
    pub fn versions() -> Vec<i64> {
        MIGRATOR.iter().map(|migration| migration.version).collect()
    }
}
