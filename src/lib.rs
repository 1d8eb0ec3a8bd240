pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod platforms;
pub mod store;

pub use config::Config;
pub use error::StatsError;

use std::sync::Arc;

/// Shared application state passed to all API handlers and the refresh daemon.
pub struct AppState {
    pub config: Config,
    pub tokens: store::TokenStore,
    pub registry: platforms::FetcherRegistry,
    pub cache: cache::StatsCache,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Open the store, register every platform and size the cache from `config`.
    pub async fn build(config: Config) -> Result<Self, StatsError> {
        let kv = store::KvStore::new(&config.database_url).await?;
        kv.migrate().await?;
        let tokens = store::TokenStore::new(kv);

        let http = platforms::http_client(&config)?;
        let mut registry = platforms::FetcherRegistry::new();
        platforms::register_defaults(&mut registry, &config, &tokens, &http);

        let cache = if config.cache_active() {
            cache::StatsCache::new(config.cache_ttl)
        } else {
            cache::StatsCache::disabled()
        };

        Ok(Self {
            config,
            tokens,
            registry,
            cache,
        })
    }
}
