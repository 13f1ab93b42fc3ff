//! Content item database operations

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::content::{Category, ContentItem, ContentKind, CreateItem};
use crate::error::{AppError, Result};

use super::schema::SUB_RECORD_TABLES;

/// Content item repository
pub struct ItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ItemRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new item at version 1
    pub async fn create(&self, data: CreateItem) -> Result<ContentItem> {
        let item = ContentItem::new(Uuid::new_v4().to_string(), data.kind, data);

        sqlx::query(
            r#"
            INSERT INTO content_items (
                id, category, kind, version, topic, instruction,
                time_limit_secs, image_url, audio_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(item.category().as_str())
        .bind(item.kind.as_str())
        .bind(item.version)
        .bind(&item.topic)
        .bind(&item.instruction)
        .bind(item.time_limit_secs)
        .bind(&item.image_url)
        .bind(&item.audio_url)
        .bind(&item.created_at)
        .bind(&item.updated_at)
        .execute(self.pool)
        .await?;

        Ok(item)
    }

    /// Get a specific item
    pub async fn get(&self, id: &str) -> Result<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, kind, version, topic, instruction, time_limit_secs,
                   image_url, audio_url, created_at, updated_at
            FROM content_items
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_item()).transpose()
    }

    /// List items for a category, newest first
    pub async fn list(&self, category: Category) -> Result<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, kind, version, topic, instruction, time_limit_secs,
                   image_url, audio_url, created_at, updated_at
            FROM content_items
            WHERE category = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(category.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_item()).collect()
    }

    /// Persist a mutated item in one statement
    ///
    /// All mutable columns plus the new version are written together.
    /// There is no check against the version currently on disk, so two
    /// concurrent writers to the same item can lose an update.
    pub async fn persist(&self, item: &ContentItem) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE content_items
            SET version = ?, topic = ?, instruction = ?, time_limit_secs = ?,
                image_url = ?, audio_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(item.version)
        .bind(&item.topic)
        .bind(&item.instruction)
        .bind(item.time_limit_secs)
        .bind(&item.image_url)
        .bind(&item.audio_url)
        .bind(&item.updated_at)
        .bind(&item.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item not found: {}", item.id)));
        }
        Ok(())
    }

    /// Delete an item and cascade to its sub-records
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        for table in SUB_RECORD_TABLES {
            let sql = format!("DELETE FROM {} WHERE item_id = ?", table);
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM content_items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch all items of a category strictly newer than the paired versions
    ///
    /// One batched query, OR of per-pair conditions, newest first.
    pub async fn newer_than(
        &self,
        category: Category,
        pairs: &[(String, i64)],
    ) -> Result<Vec<ContentItem>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let conditions: Vec<&str> = pairs.iter().map(|_| "(id = ? AND version > ?)").collect();
        let sql = format!(
            r#"
            SELECT id, kind, version, topic, instruction, time_limit_secs,
                   image_url, audio_url, created_at, updated_at
            FROM content_items
            WHERE category = ? AND ({})
            ORDER BY created_at DESC
            "#,
            conditions.join(" OR ")
        );

        let mut query = sqlx::query_as::<_, ItemRow>(&sql).bind(category.as_str());
        for (id, version) in pairs {
            query = query.bind(id).bind(version);
        }

        let rows = query.fetch_all(self.pool).await?;
        rows.into_iter().map(|r| r.into_item()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    kind: String,
    version: i64,
    topic: Option<String>,
    instruction: Option<String>,
    time_limit_secs: Option<i64>,
    image_url: Option<String>,
    audio_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ItemRow {
    fn into_item(self) -> Result<ContentItem> {
        let kind = ContentKind::parse(&self.kind)
            .ok_or_else(|| AppError::UnknownKind(self.kind.clone()))?;

        Ok(ContentItem {
            id: self.id,
            kind,
            version: self.version,
            topic: self.topic,
            instruction: self.instruction,
            time_limit_secs: self.time_limit_secs,
            image_url: self.image_url,
            audio_url: self.audio_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
