//! Fleet record core entry-point: loads settings, prepares the database and
//! initialises every record handler.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use brain::bootstrap::Services;
use brain::domain::ports::DocumentStore;
use brain::outbound::persistence::{DbPool, DieselDocumentStore, run_pending_migrations};
use brain::settings::BrainSettings;

/// Application bootstrap.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BrainSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;

    if settings.run_migrations() {
        run_pending_migrations(&settings.database_url)
            .await
            .wrap_err("failed to apply migrations")?;
    } else {
        info!("skipping migrations");
    }

    let pool = DbPool::new(settings.pool_config())
        .await
        .wrap_err("failed to create database pool")?;
    let store: Arc<dyn DocumentStore> = Arc::new(DieselDocumentStore::new(pool));
    let _services = Services::bootstrap(store, settings.system_claims())
        .await
        .wrap_err("failed to initialise record handlers")?;

    info!(
        system_party_id = settings.system_party_id(),
        pool_max_size = settings.pool_max_size,
        "record core ready"
    );
    Ok(())
}
