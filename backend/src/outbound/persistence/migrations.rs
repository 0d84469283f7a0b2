//! Embedded schema migrations.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::CollectionError;

/// Migrations from the `backend/migrations` directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn run_blocking(database_url: &str) -> Result<usize, CollectionError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| CollectionError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| CollectionError::query(format!("migration: {err}")))?;
    Ok(applied.len())
}

/// Apply pending migrations on a dedicated blocking connection.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), CollectionError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_blocking(&url))
        .await
        .map_err(|err| CollectionError::query(format!("migration task failed: {err}")))??;
    info!(applied, "database migrations applied");
    Ok(())
}
