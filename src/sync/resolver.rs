//! Incremental delta sync resolution
//!
//! Clients report `(item_id, version)` pairs from their local store and
//! receive the full detail view for every item that moved past the
//! reported version. Items at or behind the reported version are omitted
//! entirely, not returned as no-op markers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::content::{Category, ContentItem, DetailView, Status};
use crate::db::ItemRepository;
use crate::error::{AppError, Result};

use super::assembler::DetailAssembler;
use super::pipeline::ContentSyncer;

/// One client-reported pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPair {
    pub item_id: String,
    pub version: i64,
}

/// Delta sync request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaSyncRequest {
    pub pairs: Vec<SyncPair>,
}

/// Resolves delta sync requests against cache and store
///
/// Read-only: it never mutates the stores it consults.
pub struct DeltaSyncResolver<'a> {
    syncer: &'a ContentSyncer,
}

impl<'a> DeltaSyncResolver<'a> {
    pub fn new(syncer: &'a ContentSyncer) -> Self {
        Self { syncer }
    }

    /// Return the full detail for every item strictly newer than reported
    ///
    /// Duplicate ids in the batch are de-duplicated last-pair-wins.
    /// Results are ordered by creation time, newest first; callers are
    /// expected to submit bounded batches.
    pub async fn resolve(&self, category: Category, pairs: &[SyncPair]) -> Result<Vec<DetailView>> {
        // Last-pair-wins de-duplication
        let mut by_id: HashMap<&str, i64> = HashMap::new();
        for pair in pairs {
            by_id.insert(pair.item_id.as_str(), pair.version);
        }

        // Cache probe at the reported version: a hit under either status
        // is taken to mean no newer version has been cached since. That
        // is a heuristic, not a proof; swap this probe for a
        // current-version index to make it exact.
        let mut unresolved: Vec<(String, i64)> = Vec::new();
        for (item_id, version) in by_id {
            if !self
                .probe_reported_version(category, item_id, version)
                .await
            {
                unresolved.push((item_id.to_string(), version));
            }
        }

        let items = ItemRepository::new(self.syncer.pool())
            .newer_than(category, &unresolved)
            .await?;

        self.collect_views(category, items).await
    }

    /// Build views for store rows, preferring current-version cache hits
    ///
    /// An item deleted after the batch query vanishes from the response
    /// instead of failing the whole batch.
    async fn collect_views(
        &self,
        category: Category,
        items: Vec<ContentItem>,
    ) -> Result<Vec<DetailView>> {
        let assembler = DetailAssembler::new(self.syncer.pool());
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let view = match self
                .syncer
                .cached_view(category, &item.id, item.version)
                .await
            {
                Some(view) => view,
                None => match assembler.assemble(&item.id).await {
                    Ok(view) => view,
                    Err(AppError::NotFound(_)) => continue,
                    Err(e) => return Err(e),
                },
            };
            views.push(view);
        }

        Ok(views)
    }

    async fn probe_reported_version(
        &self,
        category: Category,
        item_id: &str,
        version: i64,
    ) -> bool {
        for status in [Status::Complete, Status::Uncomplete] {
            let key = CacheKey::detail(category, item_id, status, version);
            match self.syncer.cache().get(&key).await {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(e) => {
                    // Treat an unreachable cache as a miss
                    tracing::warn!("Cache probe failed for {}: {}", key, e);
                }
            }
        }
        false
    }
}
