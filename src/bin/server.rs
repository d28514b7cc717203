use anyhow::Context;
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let settings = Settings::load().context("Failed to load settings")?;

    let pool = db::establish_connection(&settings.database_url, settings.max_connections)
        .await
        .with_context(|| format!("Cannot connect to {}", settings.database_url))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    run_server(pool, &settings.listen_addr).await
}
