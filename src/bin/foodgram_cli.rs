//! # Foodgram CLI
//!
//! Management commands: schema migrations and catalogue fixture loading.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use foodgram::config::ConfigLoader;
use foodgram::database::{DatabaseConnection, DatabaseMigrations};
use foodgram::logging::init_logging;
use foodgram::services::{load_ingredients, load_tags, LoadReport};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "foodgram-cli")]
#[command(about = "Management commands for the Foodgram backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (overrides FOODGRAM_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Load tags from a JSON array of {name, slug}
    LoadTags {
        /// Fixture file path
        path: PathBuf,
    },

    /// Load ingredients from a JSON array of {name, measurement_unit}
    LoadIngredients {
        /// Fixture file path
        path: PathBuf,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    ConfigLoader::load_env_file();
    init_logging("foodgram-cli");

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::load_from_env()?,
    };

    if matches!(cli.command, Commands::CheckConfig) {
        println!(
            "Configuration OK: server {}, gateway {} with {} routes",
            config.server.bind_address,
            config.gateway.bind_address,
            config.gateway.routes.len()
        );
        return Ok(());
    }

    let db = DatabaseConnection::connect(&config.database).await?;
    let pool = db.pool();

    match cli.command {
        Commands::Migrate => {
            DatabaseMigrations::run_all(pool).await?;
            println!("Migrations applied");
        }
        Commands::LoadTags { path } => {
            let report = load_tags(pool, &path).await?;
            print_report("tags", &report);
        }
        Commands::LoadIngredients { path } => {
            let report = load_ingredients(pool, &path).await?;
            print_report("ingredients", &report);
        }
        Commands::CheckConfig => {}
    }

    db.close().await;
    Ok(())
}

fn print_report(kind: &str, report: &LoadReport) {
    println!(
        "Loaded {kind}: {} created, {} already present",
        report.created, report.existing
    );
}
