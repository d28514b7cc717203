use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trivia_api::db::{self, transfer};
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database url, overrides the configured one
    #[clap(long)]
    database_url: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Export categories and questions as csv files into a directory
    Export { path: PathBuf },
    /// Replace categories and questions with the csv files in a directory
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let url = cli.database_url.unwrap_or(settings.database_url);

    let pool = db::establish_connection(&url, 1)
        .await
        .with_context(|| format!("Cannot connect to {url}"))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::Migrate => tracing::info!("Database is up to date"),
        Commands::Export { path } => {
            transfer::export_data(&pool, &path)
                .await
                .context("Cannot export")?;
            tracing::info!("Exported to {}", path.display());
        }
        Commands::Import { path } => {
            transfer::import_data(&pool, &path)
                .await
                .context("Cannot import")?;
            tracing::info!("Imported from {}", path.display());
        }
    }
    Ok(())
}
