use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool manager. The marketplace lives in a single Postgres
/// database; the pool is created lazily on first use and shared for the
/// lifetime of the process.
pub struct DatabaseManager;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

impl DatabaseManager {
    pub async fn pool() -> Result<&'static PgPool, DatabaseError> {
        POOL.get_or_try_init(|| async {
            let url = std::env::var("DATABASE_URL")
                .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

            let db_config = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(db_config.max_connections)
                .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
                .connect(&url)
                .await?;

            info!("Created database pool ({} max connections)", db_config.max_connections);
            Ok::<_, DatabaseError>(pool)
        })
        .await
    }

    /// Apply pending schema migrations. Run once at startup.
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
