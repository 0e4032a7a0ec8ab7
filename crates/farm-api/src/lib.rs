//! Persistence, per-player serialization, and the HTTP surface over the farm engine.

mod config;
mod locks;
mod server;
mod service;
mod store;

use std::sync::Arc;

use farm_core::Clock;

pub use config::{
    ConfigError, FarmConfig, ServerConfig, DEFAULT_ADDR, DEFAULT_CONFIG_FILE, DEFAULT_PLAYER_ID,
    DEFAULT_SQLITE_PATH,
};
pub use locks::{PlayerGuard, PlayerLocks};
pub use server::{router, serve, AppState, ServerError};
pub use service::{Applied, FarmService, ServiceError};
pub use store::{FarmStore, SqliteFarmStore, StoreError};

/// Opens the configured SQLite store and wraps it in a service. Seeds the
/// default player when the config asks for it.
pub async fn open_service(
    config: &FarmConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<FarmService>, ServiceError> {
    let store = SqliteFarmStore::open(&config.server.sqlite_path)?;
    tracing::info!(path = %config.server.sqlite_path.display(), "sqlite store opened");

    let service = Arc::new(FarmService::new(
        Arc::new(store),
        clock,
        config.balance.clone(),
    ));
    if config.server.seed_default_player && service.ensure_player(DEFAULT_PLAYER_ID).await? {
        tracing::info!(player_id = DEFAULT_PLAYER_ID, "seeded default player");
    }
    Ok(service)
}
