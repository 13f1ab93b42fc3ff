//! Sub-record database operations
//!
//! One table per variant; every row belongs to exactly one content item.
//! Mutations here never touch the parent row or its version. Callers are
//! expected to resync the parent's derived stores afterwards.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::content::subrecord::{
    BlankRecord, ChoiceRecord, CreateSubRecord, EssayRecord, LessonRecord, MatchingRecord,
    SenseRecord, SentenceRecord, TrueFalseRecord,
};
use crate::content::{ContentItem, ContentKind};
use crate::error::{AppError, Result};

/// Sub-record repository
pub struct SubRecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubRecordRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a sub-record under an item, returning the new record id
    ///
    /// The variant must be one the item's kind accepts.
    pub async fn insert(&self, item: &ContentItem, data: &CreateSubRecord) -> Result<String> {
        if !variant_allowed(item.kind, data) {
            return Err(AppError::Validation(format!(
                "sub-record variant does not match item kind {}",
                item.kind.as_str()
            )));
        }

        let id = Uuid::new_v4().to_string();
        match data {
            CreateSubRecord::Blank {
                question,
                answer,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO blank_records (id, item_id, question, answer, position) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(question)
                .bind(answer)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Choice {
                question,
                options,
                correct_index,
                position,
            } => {
                if options.is_empty() || *correct_index < 0 || *correct_index >= options.len() as i64
                {
                    return Err(AppError::Validation(
                        "correct index must point into the options list".to_string(),
                    ));
                }
                let options_json = serde_json::to_string(options)?;
                sqlx::query(
                    "INSERT INTO choice_records (id, item_id, question, options, correct_index, position) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(question)
                .bind(&options_json)
                .bind(correct_index)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::TrueFalse {
                statement,
                is_true,
                explanation,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO true_false_records (id, item_id, statement, is_true, explanation, position) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(statement)
                .bind(is_true)
                .bind(explanation)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Matching {
                left_text,
                right_text,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO matching_records (id, item_id, left_text, right_text, position) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(left_text)
                .bind(right_text)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Sentence {
                prompt,
                reference_answer,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO sentence_records (id, item_id, prompt, reference_answer, position) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(prompt)
                .bind(reference_answer)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Essay {
                prompt,
                min_words,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO essay_records (id, item_id, prompt, min_words, position) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(prompt)
                .bind(min_words)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Lesson {
                title,
                body,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO lesson_records (id, item_id, title, body, position) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(title)
                .bind(body)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
            CreateSubRecord::Sense {
                definition,
                example,
                part_of_speech,
                position,
            } => {
                sqlx::query(
                    "INSERT INTO sense_records (id, item_id, definition, example, part_of_speech, position) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&item.id)
                .bind(definition)
                .bind(example)
                .bind(part_of_speech)
                .bind(position)
                .execute(self.pool)
                .await?;
            }
        }

        Ok(id)
    }

    /// Delete one sub-record owned by an item
    ///
    /// Only the tables the item's kind can populate are checked.
    pub async fn delete(&self, item: &ContentItem, record_id: &str) -> Result<bool> {
        for table in tables_for(item.kind) {
            let sql = format!("DELETE FROM {} WHERE id = ? AND item_id = ?", table);
            let result = sqlx::query(&sql)
                .bind(record_id)
                .bind(&item.id)
                .execute(self.pool)
                .await?;
            if result.rows_affected() > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn blanks_for(&self, item_id: &str) -> Result<Vec<BlankRecord>> {
        let records = sqlx::query_as::<_, BlankRecord>(
            "SELECT id, item_id, question, answer, position FROM blank_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn choices_for(&self, item_id: &str) -> Result<Vec<ChoiceRecord>> {
        let rows = sqlx::query_as::<_, ChoiceRow>(
            "SELECT id, item_id, question, options, correct_index, position FROM choice_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(|r| r.into_record()).collect()
    }

    pub async fn true_false_for(&self, item_id: &str) -> Result<Vec<TrueFalseRecord>> {
        let records = sqlx::query_as::<_, TrueFalseRecord>(
            "SELECT id, item_id, statement, is_true, explanation, position FROM true_false_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn pairs_for(&self, item_id: &str) -> Result<Vec<MatchingRecord>> {
        let records = sqlx::query_as::<_, MatchingRecord>(
            "SELECT id, item_id, left_text, right_text, position FROM matching_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn sentences_for(&self, item_id: &str) -> Result<Vec<SentenceRecord>> {
        let records = sqlx::query_as::<_, SentenceRecord>(
            "SELECT id, item_id, prompt, reference_answer, position FROM sentence_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn essays_for(&self, item_id: &str) -> Result<Vec<EssayRecord>> {
        let records = sqlx::query_as::<_, EssayRecord>(
            "SELECT id, item_id, prompt, min_words, position FROM essay_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn lessons_for(&self, item_id: &str) -> Result<Vec<LessonRecord>> {
        let records = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, item_id, title, body, position FROM lesson_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn senses_for(&self, item_id: &str) -> Result<Vec<SenseRecord>> {
        let records = sqlx::query_as::<_, SenseRecord>(
            "SELECT id, item_id, definition, example, part_of_speech, position FROM sense_records WHERE item_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }
}

/// Whether a create-request variant is valid for an item kind
fn variant_allowed(kind: ContentKind, data: &CreateSubRecord) -> bool {
    match (kind, data) {
        (ContentKind::FillInTheBlank, CreateSubRecord::Blank { .. }) => true,
        (ContentKind::MultipleChoice, CreateSubRecord::Choice { .. }) => true,
        (ContentKind::TrueFalse, CreateSubRecord::TrueFalse { .. }) => true,
        (
            ContentKind::Listening,
            CreateSubRecord::Blank { .. }
            | CreateSubRecord::Choice { .. }
            | CreateSubRecord::Matching { .. },
        ) => true,
        (ContentKind::Reading, CreateSubRecord::Choice { .. }) => true,
        (ContentKind::Speaking, CreateSubRecord::Sentence { .. }) => true,
        (ContentKind::SentenceCompletion, CreateSubRecord::Sentence { .. }) => true,
        (ContentKind::Essay, CreateSubRecord::Essay { .. }) => true,
        (ContentKind::Course, CreateSubRecord::Lesson { .. }) => true,
        (ContentKind::DictionaryEntry, CreateSubRecord::Sense { .. }) => true,
        _ => false,
    }
}

/// Tables a given kind can populate
fn tables_for(kind: ContentKind) -> &'static [&'static str] {
    match kind {
        ContentKind::FillInTheBlank => &["blank_records"],
        ContentKind::MultipleChoice => &["choice_records"],
        ContentKind::TrueFalse => &["true_false_records"],
        ContentKind::Listening => &["blank_records", "choice_records", "matching_records"],
        ContentKind::Reading => &["choice_records"],
        ContentKind::Speaking => &["sentence_records"],
        ContentKind::SentenceCompletion => &["sentence_records"],
        ContentKind::Essay => &["essay_records"],
        ContentKind::Course => &["lesson_records"],
        ContentKind::DictionaryEntry => &["sense_records"],
    }
}

#[derive(sqlx::FromRow)]
struct ChoiceRow {
    id: String,
    item_id: String,
    question: String,
    options: String,
    correct_index: i64,
    position: i64,
}

impl ChoiceRow {
    fn into_record(self) -> Result<ChoiceRecord> {
        let options: Vec<String> = serde_json::from_str(&self.options)?;
        Ok(ChoiceRecord {
            id: self.id,
            item_id: self.item_id,
            question: self.question,
            options,
            correct_index: self.correct_index,
            position: self.position,
        })
    }
}
