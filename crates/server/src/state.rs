//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::{CACHE_TTL, CustomerCache, MokaBackend};
use crate::config::ServerConfig;
use crate::services::{CustomerService, PgStore};

/// The service as wired in production.
pub type Service = CustomerService<PgStore, MokaBackend>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; the pool and cache are created once at
/// startup and handed to every request through this value.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service: Service,
}

impl AppState {
    /// Create a new application state over `pool` with an empty cache sized
    /// from `config`.
    #[must_use]
    pub fn new(config: &ServerConfig, pool: PgPool) -> Self {
        let cache = CustomerCache::new(MokaBackend::new(config.cache_capacity, CACHE_TTL));
        let service = CustomerService::new(PgStore::new(pool), cache);

        Self {
            inner: Arc::new(AppStateInner { service }),
        }
    }

    /// Get a reference to the customer service.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.inner.service
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.service.store().pool()
    }
}
