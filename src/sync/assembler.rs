//! Detail view assembly
//!
//! Always reads current store state; whether to consult the cache first is
//! the caller's decision.

use sqlx::SqlitePool;

use crate::content::{ContentKind, DetailView};
use crate::db::{ItemRepository, SubRecordRepository};
use crate::error::{AppError, Result};

/// Builds detail views from the relational store
pub struct DetailAssembler<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DetailAssembler<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load an item and the sub-record collections its kind maps to
    ///
    /// Fails with `NotFound` for a missing item. A stored kind string with
    /// no mapping fails inside the item repository with `UnknownKind`
    /// rather than producing a silently empty view.
    pub async fn assemble(&self, item_id: &str) -> Result<DetailView> {
        let item = ItemRepository::new(self.pool)
            .get(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item not found: {}", item_id)))?;

        let records = SubRecordRepository::new(self.pool);
        let mut view = DetailView::empty(item);

        match view.item.kind {
            ContentKind::FillInTheBlank => {
                view.blanks = records.blanks_for(item_id).await?;
            }
            ContentKind::MultipleChoice | ContentKind::Reading => {
                view.choices = records.choices_for(item_id).await?;
            }
            ContentKind::TrueFalse => {
                view.true_false = records.true_false_for(item_id).await?;
            }
            ContentKind::Listening => {
                view.blanks = records.blanks_for(item_id).await?;
                view.choices = records.choices_for(item_id).await?;
                view.pairs = records.pairs_for(item_id).await?;
            }
            ContentKind::Speaking | ContentKind::SentenceCompletion => {
                view.sentences = records.sentences_for(item_id).await?;
            }
            ContentKind::Essay => {
                view.essays = records.essays_for(item_id).await?;
            }
            ContentKind::Course => {
                view.lessons = records.lessons_for(item_id).await?;
            }
            ContentKind::DictionaryEntry => {
                view.senses = records.senses_for(item_id).await?;
            }
        }

        Ok(view)
    }
}
