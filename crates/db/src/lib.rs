//! Persistence layer: connection pool, migrations, models and repositories.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Migrations embedded from `db/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// How the database schema compares to the migrations this build embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Newest successfully applied version, if any.
    pub applied_version: Option<i64>,
    /// Newest version this build knows about.
    pub expected_version: Option<i64>,
    /// Embedded versions not yet applied, oldest first.
    pub pending: Vec<i64>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Compare `_sqlx_migrations` with [`MIGRATOR`].
pub async fn migration_status(pool: &DbPool) -> Result<MigrationStatus, sqlx::Error> {
    let applied: Vec<i64> = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version",
    )
    .fetch_all(pool)
    .await?;

    let expected: Vec<i64> = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| m.version)
        .collect();

    Ok(MigrationStatus {
        applied_version: applied.last().copied(),
        expected_version: expected.iter().max().copied(),
        pending: expected
            .into_iter()
            .filter(|v| applied.binary_search(v).is_err())
            .collect(),
    })
}
