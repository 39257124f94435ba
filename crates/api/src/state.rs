use std::sync::Arc;

use crate::auth::identity_cache::IdentityCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and cache are handles, the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: talent_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Short-lived cache of session identities, keyed by user id.
    pub identity_cache: IdentityCache,
}

impl AppState {
    pub fn new(pool: talent_db::DbPool, config: ServerConfig) -> Self {
        let identity_cache = IdentityCache::new(&config.identity_cache);
        Self {
            pool,
            config: Arc::new(config),
            identity_cache,
        }
    }
}
