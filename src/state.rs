//! Application state management

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::cache::DetailCache;
use crate::config::Config;
use crate::sync::ContentSyncer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    syncer: ContentSyncer,
}

impl AppState {
    /// Create a new application state with an injected detail cache
    pub fn new(config: Config, db: SqlitePool, cache: Arc<dyn DetailCache>) -> Self {
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        let syncer = ContentSyncer::new(db.clone(), cache, ttl);

        Self {
            inner: Arc::new(AppStateInner { config, db, syncer }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the content syncer
    pub fn syncer(&self) -> &ContentSyncer {
        &self.inner.syncer
    }
}
