//! Short-lived cache of session identities keyed by user id.
//!
//! Owned by [`AppState`](crate::state::AppState) and sized from config.
//! Nothing relies on it for correctness: an entry is at worst one TTL out of
//! date and a miss simply reads the `users` table.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use talent_core::types::DbId;
use talent_db::models::user::UserResponse;
use talent_db::repositories::UserRepo;

const DEFAULT_TTL_SECS: u64 = 30;
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Bounds for the identity cache.
#[derive(Debug, Clone)]
pub struct IdentityCacheConfig {
    pub ttl: Duration,
    pub max_entries: u64,
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl IdentityCacheConfig {
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `IDENTITY_CACHE_TTL_SECS`    | `30`    |
    /// | `IDENTITY_CACHE_MAX_ENTRIES` | `10000` |
    pub fn from_env() -> Self {
        let ttl_secs: u64 = std::env::var("IDENTITY_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
            .parse()
            .expect("IDENTITY_CACHE_TTL_SECS must be a valid u64");

        let max_entries: u64 = std::env::var("IDENTITY_CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| DEFAULT_MAX_ENTRIES.to_string())
            .parse()
            .expect("IDENTITY_CACHE_MAX_ENTRIES must be a valid u64");

        Self {
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }
}

/// Bounded time-to-live map from user id to public identity.
#[derive(Clone)]
pub struct IdentityCache {
    cache: Cache<DbId, UserResponse>,
}

impl IdentityCache {
    pub fn new(config: &IdentityCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Cached identity, if present and younger than the TTL.
    pub async fn get(&self, user_id: DbId) -> Option<UserResponse> {
        self.cache.get(&user_id).await
    }

    pub async fn insert(&self, identity: UserResponse) {
        self.cache.insert(identity.id, identity).await;
    }

    /// Drop an entry after the user row changed.
    pub async fn invalidate(&self, user_id: DbId) {
        self.cache.invalidate(&user_id).await;
    }

    /// Return the cached identity or load and cache it. Missing users are
    /// not cached.
    pub async fn get_or_load(
        &self,
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        if let Some(hit) = self.get(user_id).await {
            return Ok(Some(hit));
        }
        let Some(user) = UserRepo::find_by_id(pool, user_id).await? else {
            return Ok(None);
        };
        let identity = UserResponse::from(&user);
        self.insert(identity.clone()).await;
        tracing::debug!(user_id, "Identity cache filled");
        Ok(Some(identity))
    }
}
