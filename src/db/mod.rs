//! Postgres pool, schema migrations and the `/health` probe

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};

use crate::config::Config;

/// Migrations embedded from `./migrations` at build time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Failed to connect to database: {0}")]
    Connect(String),

    #[error("Failed to apply schema migrations: {0}")]
    Migrate(String),

    #[error("Database unreachable: {0}")]
    Unreachable(String),
}

/// What the health endpoint reports about the database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    /// Postgres version number, e.g. `15.4`
    pub server_version: String,
    /// Latest applied migration, `None` on an unmigrated database
    pub schema_version: Option<i64>,
    pub latency_ms: u64,
}

pub async fn create_pool(config: &Config) -> Result<PgPool, DbError> {
    tracing::info!(url = %config.database_url_masked(), "Connecting to loan desk database");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await
        .map_err(|e| DbError::Connect(e.to_string()))?;

    tracing::info!(max_connections = config.db_max_connections, "Database pool ready");
    Ok(pool)
}

/// Bring the schema up to date; returns the schema version afterwards.
pub async fn run_migrations(pool: &PgPool) -> Result<Option<i64>, DbError> {
    let known = MIGRATOR.iter().count();

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DbError::Migrate(e.to_string()))?;

    let version = schema_version(pool)
        .await
        .map_err(|e| DbError::Migrate(e.to_string()))?;

    tracing::info!(migrations = known, schema_version = ?version, "Schema up to date");
    Ok(version)
}

async fn schema_version(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
    let (version,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;
    Ok(version)
}

/// Round-trip to the server and report its version and the schema version
pub async fn check_health(pool: &PgPool) -> Result<DatabaseStatus, DbError> {
    let started = Instant::now();

    let (raw_version,): (String,) = sqlx::query_as("SHOW server_version")
        .fetch_one(pool)
        .await
        .map_err(|e| DbError::Unreachable(e.to_string()))?;
    let latency_ms = started.elapsed().as_millis() as u64;

    // A pool that connects but was never migrated is still reachable.
    let schema_version = schema_version(pool).await.ok().flatten();

    Ok(DatabaseStatus {
        server_version: version_number(&raw_version),
        schema_version,
        latency_ms,
    })
}

/// `SHOW server_version` may carry a distribution suffix: "15.4 (Debian 15.4-1)"
fn version_number(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_number_strips_distribution_suffix() {
        assert_eq!(version_number("15.4 (Debian 15.4-1.pgdg120+1)"), "15.4");
        assert_eq!(version_number("16.2"), "16.2");
        assert_eq!(version_number(""), "");
    }

    #[test]
    fn test_schema_migrations_are_embedded() {
        assert!(MIGRATOR.iter().any(|m| m.description.contains("initial schema")));
    }
}
