//! Configuration management for the Lingo server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for detail cache entries, in seconds
    pub ttl_secs: u64,
    /// How often expired entries are swept out
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// How often the outbox drainer runs
    pub drain_interval_secs: u64,
    /// Maximum outbox rows picked up per drain pass
    pub drain_batch_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./lingo.db".to_string(),
            },
            cache: CacheConfig {
                ttl_secs: 24 * 60 * 60,
                sweep_interval_secs: 300,
            },
            sync: SyncConfig {
                drain_interval_secs: 30,
                drain_batch_size: 100,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            cache: CacheConfig {
                ttl_secs: env::var("CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.cache.ttl_secs),
                sweep_interval_secs: env::var("CACHE_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.cache.sweep_interval_secs),
            },
            sync: SyncConfig {
                drain_interval_secs: env::var("SYNC_DRAIN_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.sync.drain_interval_secs),
                drain_batch_size: env::var("SYNC_DRAIN_BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.sync.drain_batch_size),
            },
        }
    }
}
