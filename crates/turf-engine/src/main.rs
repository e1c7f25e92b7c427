//! Territory engine binary.
//!
//! Entry point that wires the engine together: loads configuration,
//! seeds the world, connects the `PostgreSQL` mirror when configured,
//! spawns the three sweep workers, and serves the observer HTTP API.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `turf-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the engine and seed regions at neutral state
//! 4. Connect to `PostgreSQL` and run migrations (if configured)
//! 5. Spawn the aggregation, decay, and trigger workers
//! 6. Serve the observer API until the process is stopped

mod error;
mod workers;

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use turf_core::{ConfigError, EngineConfig, TerritoryEngine};
use turf_db::{PostgresPool, mirror};
use turf_observer::{AppState, start_server};

use crate::error::EngineBinError;

/// Application entry point for the territory engine.
///
/// # Errors
///
/// Returns an error if any startup step fails. Worker tick failures
/// after startup are logged, not fatal.
#[tokio::main]
async fn main() -> Result<(), EngineBinError> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("turf-engine starting");
    info!(
        world_name = config.world.name,
        regions = config.regions.len(),
        aggregation_interval_secs = config.workers.aggregation_interval_secs,
        decay_interval_secs = config.workers.decay_interval_secs,
        trigger_interval_secs = config.workers.trigger_interval_secs,
        "Configuration loaded"
    );

    let bind_addr = config.infrastructure.bind_addr.clone();
    let database_url = config.infrastructure.database_url.clone();

    let engine = Arc::new(TerritoryEngine::from_config(config).await?);
    info!(
        regions = engine.region_ids().await.len(),
        "World seeded at neutral state"
    );

    let pool = connect_mirror(&engine, database_url.as_deref()).await?;

    let state = Arc::new(AppState::new(Arc::clone(&engine)));
    let handles = workers::spawn_workers(&state, pool);
    info!("Sweep workers started");

    info!(bind_addr = bind_addr, "Starting observer API server");
    let result = start_server(&bind_addr, state).await;

    handles.aggregation.abort();
    handles.decay.abort();
    handles.trigger.abort();

    result?;
    info!("turf-engine shutdown complete");
    Ok(())
}

/// Load configuration from the path given as the first CLI argument,
/// falling back to `turf-config.yaml`, then to built-in defaults when
/// no file exists.
fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("turf-config.yaml"));
    let path = Path::new(&path);
    if path.exists() {
        EngineConfig::from_file(path)
    } else {
        let mut config = EngineConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// Connect the `PostgreSQL` mirror, run migrations, and write the
/// seeded region records.
///
/// Returns `None` when no database URL is configured; the engine then
/// runs in-memory only.
async fn connect_mirror(
    engine: &Arc<TerritoryEngine>,
    database_url: Option<&str>,
) -> Result<Option<Arc<PostgresPool>>, EngineBinError> {
    let Some(url) = database_url else {
        info!("No database URL configured, running in-memory only");
        return Ok(None);
    };

    info!("Connecting to PostgreSQL");
    let pool = PostgresPool::connect_url(url).await?;
    pool.run_migrations().await?;

    let mut regions = Vec::new();
    for id in engine.region_ids().await {
        regions.push(engine.region(id).await?);
    }
    mirror::mirror_regions(pool.pool(), &regions).await?;
    info!(regions = regions.len(), "PostgreSQL mirror ready");

    Ok(Some(Arc::new(pool)))
}
