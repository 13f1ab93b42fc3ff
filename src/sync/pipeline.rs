//! Write-path synchronization pipeline
//!
//! After every mutation the authoritative row is rebuilt into a detail
//! view and pushed into the cache and the search index. Both pushes are
//! best-effort: a failure is logged and left for the outbox drainer, never
//! surfaced to the caller of the originating mutation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::cache::{CacheKey, DetailCache};
use crate::content::{Category, DetailView, Status};
use crate::error::{AppError, Result};
use crate::search::SearchIndex;

use super::assembler::DetailAssembler;
use super::outbox::{OutboxReason, OutboxRepository};

/// How long applied outbox rows are kept for diagnostics before the
/// drainer deletes them
const APPLIED_RETENTION_HOURS: i64 = 24;

/// Keeps cache and search index in step with the relational store
#[derive(Clone)]
pub struct ContentSyncer {
    pool: SqlitePool,
    cache: Arc<dyn DetailCache>,
    ttl: Duration,
}

impl ContentSyncer {
    pub fn new(pool: SqlitePool, cache: Arc<dyn DetailCache>, ttl: Duration) -> Self {
        Self { pool, cache, ttl }
    }

    pub fn cache(&self) -> &Arc<dyn DetailCache> {
        &self.cache
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record a resync request and attempt it inline
    ///
    /// The outbox row is the durable part; the inline attempt is the happy
    /// path that usually applies it immediately. Store errors propagate,
    /// cache/search degradation does not.
    pub async fn sync_after_mutation(&self, item_id: &str, category: Category) -> Result<DetailView> {
        let outbox = OutboxRepository::new(&self.pool);
        let entry_id = outbox
            .enqueue(item_id, category, OutboxReason::Upsert)
            .await?;

        let (view, fully_synced) = self.resync(item_id, category).await?;
        if fully_synced {
            if let Err(e) = outbox.mark_applied(entry_id).await {
                tracing::warn!("Failed to mark outbox entry {} applied: {}", entry_id, e);
            }
        }
        Ok(view)
    }

    /// Rebuild the view and push it to cache and search
    ///
    /// Returns the view and whether both derived stores accepted it.
    pub async fn resync(&self, item_id: &str, category: Category) -> Result<(DetailView, bool)> {
        let view = DetailAssembler::new(&self.pool).assemble(item_id).await?;
        let status = Status::of(&view);

        let mut fully_synced = true;

        // Prior-version keys are left to expire via TTL
        let key = CacheKey::detail(category, item_id, status, view.item.version);
        match serde_json::to_string(&view) {
            Ok(payload) => {
                if let Err(e) = self.cache.put(&key, payload, self.ttl).await {
                    tracing::warn!("Cache sync failed for {}: {}", key, e);
                    fully_synced = false;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize detail view for {}: {}", item_id, e);
                fully_synced = false;
            }
        }

        // The same version can still be cached under the other status from
        // before this mutation; evict it so reads never serve a stale facet
        let stale = CacheKey::detail(category, item_id, status.opposite(), view.item.version);
        if let Err(e) = self.cache.remove_prefix(&stale).await {
            tracing::warn!("Stale facet eviction failed for {}: {}", stale, e);
            fully_synced = false;
        }

        if let Err(e) = SearchIndex::new(&self.pool).upsert(&view, status).await {
            tracing::warn!("Search sync failed for {}: {}", item_id, e);
            fully_synced = false;
        }

        Ok((view, fully_synced))
    }

    /// Evict an item from cache and search after deletion
    ///
    /// Cache eviction is explicit and pattern-based: passive TTL alone
    /// would leave orphaned entries for a deleted item.
    pub async fn purge_after_delete(&self, item_id: &str, category: Category) -> Result<()> {
        let outbox = OutboxRepository::new(&self.pool);
        let entry_id = outbox
            .enqueue(item_id, category, OutboxReason::Delete)
            .await?;

        if self.purge(item_id, category).await {
            if let Err(e) = outbox.mark_applied(entry_id).await {
                tracing::warn!("Failed to mark outbox entry {} applied: {}", entry_id, e);
            }
        }
        Ok(())
    }

    async fn purge(&self, item_id: &str, category: Category) -> bool {
        let mut fully_purged = true;

        let prefix = CacheKey::item_prefix(category, item_id);
        if let Err(e) = self.cache.remove_prefix(&prefix).await {
            tracing::warn!("Cache eviction failed for {}: {}", prefix, e);
            fully_purged = false;
        }

        if let Err(e) = SearchIndex::new(&self.pool).remove(item_id).await {
            tracing::warn!("Search removal failed for {}: {}", item_id, e);
            fully_purged = false;
        }

        fully_purged
    }

    /// Probe the cache for a view at a known version, either status
    pub async fn cached_view(
        &self,
        category: Category,
        item_id: &str,
        version: i64,
    ) -> Option<DetailView> {
        for status in [Status::Complete, Status::Uncomplete] {
            let key = CacheKey::detail(category, item_id, status, version);
            match self.cache.get(&key).await {
                Ok(Some(payload)) => match serde_json::from_str(&payload) {
                    Ok(view) => return Some(view),
                    Err(e) => {
                        tracing::warn!("Corrupt cache entry under {}: {}", key, e);
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Cache read failed for {}: {}", key, e);
                }
            }
        }
        None
    }

    /// Retry unapplied outbox entries
    ///
    /// Items deleted since the entry was enqueued are purged instead of
    /// rebuilt. Returns how many entries were applied.
    pub async fn drain_outbox(&self, limit: i64) -> Result<usize> {
        let outbox = OutboxRepository::new(&self.pool);
        let pending = outbox.pending(limit).await?;
        let mut applied = 0;

        for entry in pending {
            let done = match entry.reason {
                OutboxReason::Delete => self.purge(&entry.item_id, entry.category).await,
                OutboxReason::Upsert => match self.resync(&entry.item_id, entry.category).await {
                    Ok((_, fully_synced)) => fully_synced,
                    Err(AppError::NotFound(_)) => {
                        // Deleted after the resync was queued
                        self.purge(&entry.item_id, entry.category).await
                    }
                    Err(e) => {
                        tracing::warn!("Outbox resync failed for {}: {}", entry.item_id, e);
                        false
                    }
                },
            };

            if done {
                outbox.mark_applied(entry.id).await?;
                applied += 1;
            } else {
                outbox.bump_attempts(entry.id).await?;
            }
        }

        // Applied rows are only diagnostics; stop the table growing forever
        let cutoff = Utc::now() - chrono::Duration::hours(APPLIED_RETENTION_HOURS);
        if let Err(e) = outbox.cleanup_applied(cutoff).await {
            tracing::warn!("Outbox cleanup failed: {}", e);
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::content::{ContentKind, CreateItem, CreateSubRecord};
    use crate::db::{test_pool, ItemRepository, SubRecordRepository};

    const TTL: Duration = Duration::from_secs(60);

    async fn syncer(pool: &SqlitePool) -> ContentSyncer {
        SearchIndex::new(pool).initialize().await.unwrap();
        ContentSyncer::new(pool.clone(), Arc::new(MemoryCache::new()), TTL)
    }

    fn writing_request() -> CreateItem {
        CreateItem {
            kind: ContentKind::SentenceCompletion,
            topic: Some("idioms".to_string()),
            instruction: None,
            time_limit_secs: None,
            image_url: None,
            audio_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_caches_uncomplete_at_version_one() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let item = ItemRepository::new(&pool)
            .create(writing_request())
            .await
            .unwrap();

        let view = syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();
        assert_eq!(view.item.version, 1);

        let key = format!("writing_question:{}:uncomplete:1", item.id);
        assert!(syncer.cache().get(&key).await.unwrap().is_some());

        // Inline sync succeeded, nothing left to drain
        assert_eq!(
            OutboxRepository::new(&pool).backlog().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_sub_record_mutation_recaches_same_version() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let item = ItemRepository::new(&pool)
            .create(writing_request())
            .await
            .unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        SubRecordRepository::new(&pool)
            .insert(
                &item,
                &CreateSubRecord::Sentence {
                    prompt: "Break a".to_string(),
                    reference_answer: Some("leg".to_string()),
                    position: 0,
                },
            )
            .await
            .unwrap();
        let view = syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        // Parent version did not move, only the status flipped
        assert_eq!(view.item.version, 1);
        let complete_key = format!("writing_question:{}:complete:1", item.id);
        assert!(syncer.cache().get(&complete_key).await.unwrap().is_some());

        // The uncomplete entry at the same version is evicted, not left
        // to age out under the now-wrong facet
        let stale_key = format!("writing_question:{}:uncomplete:1", item.id);
        assert!(syncer.cache().get(&stale_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_flip_back_serves_fresh_facet() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let item = ItemRepository::new(&pool)
            .create(writing_request())
            .await
            .unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        let records = SubRecordRepository::new(&pool);
        let record_id = records
            .insert(
                &item,
                &CreateSubRecord::Sentence {
                    prompt: "Break a".to_string(),
                    reference_answer: Some("leg".to_string()),
                    position: 0,
                },
            )
            .await
            .unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        // Removing the only sentence flips the item back to uncomplete
        // at the same version
        records.delete(&item, &record_id).await.unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        let view = syncer
            .cached_view(Category::Writing, &item.id, 1)
            .await
            .unwrap();
        assert!(view.sentences.is_empty());

        let complete_key = format!("writing_question:{}:complete:1", item.id);
        assert!(syncer.cache().get(&complete_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_after_delete_clears_both_stores() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let items = ItemRepository::new(&pool);
        let item = items.create(writing_request()).await.unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        items.delete(&item.id).await.unwrap();
        syncer
            .purge_after_delete(&item.id, Category::Writing)
            .await
            .unwrap();

        let key = format!("writing_question:{}:uncomplete:1", item.id);
        assert!(syncer.cache().get(&key).await.unwrap().is_none());
        assert_eq!(
            SearchIndex::new(&pool).doc_count_for(&item.id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_drain_applies_pending_upsert() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let item = ItemRepository::new(&pool)
            .create(writing_request())
            .await
            .unwrap();

        // Simulate a request path whose inline sync never happened
        OutboxRepository::new(&pool)
            .enqueue(&item.id, Category::Writing, OutboxReason::Upsert)
            .await
            .unwrap();

        let applied = syncer.drain_outbox(10).await.unwrap();
        assert_eq!(applied, 1);

        let key = format!("writing_question:{}:uncomplete:1", item.id);
        assert!(syncer.cache().get(&key).await.unwrap().is_some());
        assert_eq!(OutboxRepository::new(&pool).backlog().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drain_purges_entries_for_deleted_items() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let items = ItemRepository::new(&pool);
        let item = items.create(writing_request()).await.unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        // Delete the row, then queue a stale resync for it
        items.delete(&item.id).await.unwrap();
        OutboxRepository::new(&pool)
            .enqueue(&item.id, Category::Writing, OutboxReason::Upsert)
            .await
            .unwrap();

        let applied = syncer.drain_outbox(10).await.unwrap();
        assert_eq!(applied, 1);
        assert_eq!(
            SearchIndex::new(&pool).doc_count_for(&item.id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_drain_removes_old_applied_entries() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let outbox = OutboxRepository::new(&pool);

        let id = outbox
            .enqueue("gone", Category::Writing, OutboxReason::Delete)
            .await
            .unwrap();
        outbox.mark_applied(id).await.unwrap();

        // Age the applied row past the retention window
        sqlx::query("UPDATE sync_outbox SET enqueued_at = ? WHERE id = ?")
            .bind((Utc::now() - chrono::Duration::hours(48)).to_rfc3339())
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();

        syncer.drain_outbox(10).await.unwrap();

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_outbox")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total.0, 0);
    }

    #[tokio::test]
    async fn test_cached_view_probes_both_statuses() {
        let pool = test_pool().await;
        let syncer = syncer(&pool).await;
        let item = ItemRepository::new(&pool)
            .create(writing_request())
            .await
            .unwrap();
        syncer
            .sync_after_mutation(&item.id, Category::Writing)
            .await
            .unwrap();

        let hit = syncer.cached_view(Category::Writing, &item.id, 1).await;
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().item.id, item.id);

        let miss = syncer.cached_view(Category::Writing, &item.id, 2).await;
        assert!(miss.is_none());
    }
}
