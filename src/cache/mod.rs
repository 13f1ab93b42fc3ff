//! Detail cache abstraction
//!
//! The cache is an injected collaborator, not a correctness dependency:
//! every value in it can be rebuilt from the relational store. Entries are
//! keyed by `(item, status, version)` so concurrent readers never observe
//! a half-updated value — a new version simply lands under a new key and
//! the old one ages out via TTL.

mod memory;

pub use memory::MemoryCache;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::content::{Category, Status};

/// Key-value cache for serialized detail views
#[async_trait]
pub trait DetailCache: Send + Sync {
    /// Look up a value; expired entries count as misses
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value with a time-to-live
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Remove every key starting with `prefix`, returning how many went
    async fn remove_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Cache key scheme: `<prefix>:<item_id>:<status>:<version>`
pub struct CacheKey;

impl CacheKey {
    /// Key for one detail view at a specific status and version
    pub fn detail(category: Category, item_id: &str, status: Status, version: i64) -> String {
        format!(
            "{}:{}:{}:{}",
            category.cache_prefix(),
            item_id,
            status.as_str(),
            version
        )
    }

    /// Prefix covering every entry for an item, any status or version
    pub fn item_prefix(category: Category, item_id: &str) -> String {
        format!("{}:{}:", category.cache_prefix(), item_id)
    }
}
