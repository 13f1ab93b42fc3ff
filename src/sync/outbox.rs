//! Durable resync outbox
//!
//! Every mutation records a resync request alongside the authoritative
//! write. The request path attempts the cache/search sync inline and marks
//! the row applied on success; rows that stay unapplied (cache or search
//! was down) are retried by the background drainer, making eventual
//! consistency an explicit guarantee instead of a logging side effect.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::content::Category;
use crate::error::Result;

/// Why a resync was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxReason {
    /// Rebuild cache entry and search document
    Upsert,
    /// Evict cache entries and remove the search document
    Delete,
}

impl OutboxReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxReason::Upsert => "upsert",
            OutboxReason::Delete => "delete",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "delete" => OutboxReason::Delete,
            _ => OutboxReason::Upsert,
        }
    }
}

/// A pending resync request
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: i64,
    pub item_id: String,
    pub category: Category,
    pub reason: OutboxReason,
    pub attempts: i64,
}

/// Repository for the resync outbox
pub struct OutboxRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OutboxRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a resync request, returning its row id
    pub async fn enqueue(
        &self,
        item_id: &str,
        category: Category,
        reason: OutboxReason,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sync_outbox (item_id, category, reason, enqueued_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(item_id)
        .bind(category.as_str())
        .bind(reason.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Oldest unapplied entries, bounded
    pub async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            r#"
            SELECT id, item_id, category, reason, attempts
            FROM sync_outbox
            WHERE applied = 0
            ORDER BY enqueued_at ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(|r| r.into_entry()).collect())
    }

    /// Mark an entry as applied
    pub async fn mark_applied(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE sync_outbox SET applied = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Count an unsuccessful attempt
    pub async fn bump_attempts(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE sync_outbox SET attempts = attempts + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Number of unapplied entries (observability)
    pub async fn backlog(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_outbox WHERE applied = 0")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }

    /// Clean up applied entries older than the cutoff
    pub async fn cleanup_applied(&self, older_than: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sync_outbox WHERE applied = 1 AND enqueued_at < ?")
            .bind(older_than.to_rfc3339())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    id: i64,
    item_id: String,
    category: String,
    reason: String,
    attempts: i64,
}

impl OutboxRow {
    fn into_entry(self) -> Option<OutboxEntry> {
        let category = Category::parse(&self.category)?;
        Some(OutboxEntry {
            id: self.id,
            item_id: self.item_id,
            category,
            reason: OutboxReason::parse(&self.reason),
            attempts: self.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_enqueue_and_drain_lifecycle() {
        let pool = test_pool().await;
        let outbox = OutboxRepository::new(&pool);

        let id = outbox
            .enqueue("item-1", Category::Writing, OutboxReason::Upsert)
            .await
            .unwrap();
        assert_eq!(outbox.backlog().await.unwrap(), 1);

        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].item_id, "item-1");
        assert_eq!(pending[0].reason, OutboxReason::Upsert);

        outbox.mark_applied(id).await.unwrap();
        assert_eq!(outbox.backlog().await.unwrap(), 0);
        assert!(outbox.pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attempts_are_counted() {
        let pool = test_pool().await;
        let outbox = OutboxRepository::new(&pool);

        let id = outbox
            .enqueue("item-2", Category::Course, OutboxReason::Delete)
            .await
            .unwrap();
        outbox.bump_attempts(id).await.unwrap();
        outbox.bump_attempts(id).await.unwrap();

        let pending = outbox.pending(10).await.unwrap();
        assert_eq!(pending[0].attempts, 2);
        assert_eq!(pending[0].reason, OutboxReason::Delete);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_applied() {
        let pool = test_pool().await;
        let outbox = OutboxRepository::new(&pool);

        let a = outbox
            .enqueue("item-a", Category::Grammar, OutboxReason::Upsert)
            .await
            .unwrap();
        outbox
            .enqueue("item-b", Category::Grammar, OutboxReason::Upsert)
            .await
            .unwrap();
        outbox.mark_applied(a).await.unwrap();

        let removed = outbox
            .cleanup_applied(Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(outbox.backlog().await.unwrap(), 1);
    }
}
