//! FTS5 full-text index over content detail views
//!
//! One document per content item, keyed by item id and tagged with a
//! completeness `status` facet so search can filter complete content
//! without re-deriving it at query time. Upserts replace the document
//! wholesale; there is no partial-field patching.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::content::{DetailView, Status};
use crate::error::Result;

/// Search result for a content document
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub item_id: String,
    pub category: String,
    pub status: String,
    pub topic: Option<String>,
    /// Highlighted instruction snippet
    pub instruction_highlight: Option<String>,
    /// FTS5 rank score (lower = better match)
    pub rank: f64,
}

/// FTS5 search index service
pub struct SearchIndex<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SearchIndex<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the FTS5 virtual table (administrative, idempotent)
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS content_fts USING fts5(
                item_id UNINDEXED,
                category UNINDEXED,
                status UNINDEXED,
                topic,
                instruction,
                body,
                tokenize='unicode61 remove_diacritics 2'
            )
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Drop the index (administrative)
    pub async fn drop_index(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS content_fts")
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Replace the single document for an item
    pub async fn upsert(&self, view: &DetailView, status: Status) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM content_fts WHERE item_id = ?")
            .bind(&view.item.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO content_fts (item_id, category, status, topic, instruction, body)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&view.item.id)
        .bind(view.item.category().as_str())
        .bind(status.as_str())
        .bind(&view.item.topic)
        .bind(&view.item.instruction)
        .bind(view.body_text())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove the document for an item
    pub async fn remove(&self, item_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM content_fts WHERE item_id = ?")
            .bind(item_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Search content, optionally filtered by completeness facet
    pub async fn search(
        &self,
        query: &str,
        status: Option<Status>,
        limit: i32,
    ) -> Result<Vec<SearchHit>> {
        let sanitized = sanitize_fts5_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r#"
            SELECT
                item_id,
                category,
                status,
                topic,
                highlight(content_fts, 4, '<mark>', '</mark>') as instruction_highlight,
                content_fts.rank as rank
            FROM content_fts
            WHERE content_fts MATCH ?
            "#,
        );
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY content_fts.rank LIMIT ?");

        let mut q = sqlx::query_as::<_, SearchHit>(&sql).bind(&sanitized);
        if let Some(s) = status {
            q = q.bind(s.as_str());
        }
        let hits = q.bind(limit).fetch_all(self.pool).await?;

        Ok(hits)
    }

    /// Number of indexed documents
    pub async fn doc_count(&self) -> Result<usize> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM content_fts")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0 as usize)
    }

    /// How many documents exist for one item (invariant: 0 or 1)
    pub async fn doc_count_for(&self, item_id: &str) -> Result<usize> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM content_fts WHERE item_id = ?")
            .bind(item_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count.0 as usize)
    }
}

/// Sanitize a query string for FTS5
///
/// FTS5 has special syntax characters that need escaping or removal
/// to prevent query syntax errors.
fn sanitize_fts5_query(query: &str) -> String {
    let mut result = String::with_capacity(query.len());

    for ch in query.chars() {
        match ch {
            '"' => result.push_str("\"\""),
            '*' | '(' | ')' | ':' | '^' | '-' | '+' => {}
            _ => result.push(ch),
        }
    }

    let trimmed = result.trim();
    if trimmed.contains(' ') {
        format!("\"{}\"", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::subrecord::SentenceRecord;
    use crate::content::{ContentItem, ContentKind, CreateItem, DetailView};
    use crate::db::test_pool;

    fn view(id: &str, topic: &str) -> DetailView {
        let item = ContentItem::new(
            id.to_string(),
            ContentKind::SentenceCompletion,
            CreateItem {
                kind: ContentKind::SentenceCompletion,
                topic: Some(topic.to_string()),
                instruction: Some("Complete each sentence".to_string()),
                time_limit_secs: None,
                image_url: None,
                audio_url: None,
            },
        );
        DetailView::empty(item)
    }

    #[test]
    fn test_sanitize_fts5_query() {
        assert_eq!(sanitize_fts5_query("simple"), "simple");
        assert_eq!(sanitize_fts5_query("two words"), "\"two words\"");
        assert_eq!(sanitize_fts5_query("test*"), "test");
        assert_eq!(sanitize_fts5_query("test:value"), "testvalue");
        assert_eq!(sanitize_fts5_query("test\"quote"), "test\"\"quote");
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let pool = test_pool().await;
        let index = SearchIndex::new(&pool);
        index.initialize().await.unwrap();

        let v = view("item-1", "weather");
        index.upsert(&v, Status::Uncomplete).await.unwrap();
        index.upsert(&v, Status::Uncomplete).await.unwrap();

        assert_eq!(index.doc_count_for("item-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_status_facet() {
        let pool = test_pool().await;
        let index = SearchIndex::new(&pool);
        index.initialize().await.unwrap();

        let mut v = view("item-1", "weather");
        index.upsert(&v, Status::Uncomplete).await.unwrap();

        v.sentences.push(SentenceRecord {
            id: "s-1".to_string(),
            item_id: "item-1".to_string(),
            prompt: "It was raining cats and".to_string(),
            reference_answer: Some("dogs".to_string()),
            position: 0,
        });
        index.upsert(&v, Status::Complete).await.unwrap();

        let complete = index
            .search("weather", Some(Status::Complete), 10)
            .await
            .unwrap();
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].item_id, "item-1");

        let uncomplete = index
            .search("weather", Some(Status::Uncomplete), 10)
            .await
            .unwrap();
        assert!(uncomplete.is_empty());
    }

    #[tokio::test]
    async fn test_body_text_is_searchable() {
        let pool = test_pool().await;
        let index = SearchIndex::new(&pool);
        index.initialize().await.unwrap();

        let mut v = view("item-2", "idioms");
        v.sentences.push(SentenceRecord {
            id: "s-1".to_string(),
            item_id: "item-2".to_string(),
            prompt: "The early bird catches the".to_string(),
            reference_answer: Some("worm".to_string()),
            position: 0,
        });
        index.upsert(&v, Status::Complete).await.unwrap();

        let hits = index.search("worm", None, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_id, "item-2");
    }

    #[tokio::test]
    async fn test_remove_deletes_document() {
        let pool = test_pool().await;
        let index = SearchIndex::new(&pool);
        index.initialize().await.unwrap();

        index
            .upsert(&view("item-3", "colors"), Status::Uncomplete)
            .await
            .unwrap();
        index.remove("item-3").await.unwrap();

        assert_eq!(index.doc_count_for("item-3").await.unwrap(), 0);
        assert!(index.search("colors", None, 10).await.unwrap().is_empty());
    }
}
