pub mod pagination;
pub mod queries;
pub mod transfer;

use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use pagination::{Page, PageRequest, QUESTIONS_PER_PAGE};
pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question, QuestionFilter};

use sqlx::Error;

pub async fn establish_connection(url: &str, max_connections: u32) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Migrated in-memory database. A single connection that never expires, since
/// every new sqlite memory connection starts out empty.
pub async fn in_memory() -> Result<SqlitePool, MigrateError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
