use std::time::Duration;

use anyhow::Result;
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};

pub type DbPool = PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a Postgres pool for the booking collection.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the SQL files in `migrations/` that have not run yet.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
