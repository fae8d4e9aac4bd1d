//! Startup orchestration.
//!
//! Stores are opened in dependency order and any failure is fatal: the
//! server never starts listening without both the catalog and the counter
//! store.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogStore, SqliteCatalog};
use crate::config::{AppConfig, KvBackend};
use crate::lifecycle::Shutdown;
use crate::store::{KvStore, MemoryKvStore, StoreError, StoreResult};

/// Handles the HTTP server needs.
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub kv: Arc<dyn KvStore>,
}

/// Open the catalog and the key-value store described by `config`.
///
/// The in-memory backend gets a sweeper task tied to `shutdown`.
pub async fn open_stores(config: &AppConfig, shutdown: &Shutdown) -> StoreResult<Stores> {
    let catalog = SqliteCatalog::connect(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;

    let kv: Arc<dyn KvStore> = match config.storage.kv {
        KvBackend::Memory => {
            let store = MemoryKvStore::new();
            let _sweeper = store.spawn_sweeper(
                Duration::from_secs(config.storage.sweep_interval_secs),
                shutdown.subscribe(),
            );
            tracing::info!("Using in-memory rate-limit counters");
            Arc::new(store)
        }
        KvBackend::Redis => open_redis(config).await?,
    };

    Ok(Stores {
        catalog: Arc::new(catalog),
        kv,
    })
}

#[cfg(feature = "redis")]
async fn open_redis(config: &AppConfig) -> StoreResult<Arc<dyn KvStore>> {
    let url = config
        .storage
        .redis_url
        .as_deref()
        .ok_or_else(|| StoreError::Kv("redis_url is not set".into()))?;
    let store = crate::store::redis::RedisKvStore::connect(url).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
async fn open_redis(_config: &AppConfig) -> StoreResult<Arc<dyn KvStore>> {
    Err(StoreError::Kv(
        "storage.kv = \"redis\" requires building with the `redis` feature".into(),
    ))
}
