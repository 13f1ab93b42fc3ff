//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Content items (parent aggregate, one row per exercise/course/entry)
CREATE TABLE IF NOT EXISTS content_items (
    id TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    kind TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    topic TEXT,
    instruction TEXT,
    time_limit_secs INTEGER,
    image_url TEXT,
    audio_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_items_category ON content_items(category);
CREATE INDEX IF NOT EXISTS idx_items_created_at ON content_items(created_at);
CREATE INDEX IF NOT EXISTS idx_items_version ON content_items(category, version);

-- Fill-in-the-blank questions
CREATE TABLE IF NOT EXISTS blank_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_blank_item ON blank_records(item_id);

-- Multiple-choice questions (options stored as a JSON array)
CREATE TABLE IF NOT EXISTS choice_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    question TEXT NOT NULL,
    options TEXT NOT NULL,
    correct_index INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_choice_item ON choice_records(item_id);

-- True/false statements
CREATE TABLE IF NOT EXISTS true_false_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    statement TEXT NOT NULL,
    is_true INTEGER NOT NULL,
    explanation TEXT,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_true_false_item ON true_false_records(item_id);

-- Matching pairs
CREATE TABLE IF NOT EXISTS matching_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    left_text TEXT NOT NULL,
    right_text TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_matching_item ON matching_records(item_id);

-- Sentence prompts (sentence completion, speaking)
CREATE TABLE IF NOT EXISTS sentence_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    prompt TEXT NOT NULL,
    reference_answer TEXT,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sentence_item ON sentence_records(item_id);

-- Essay prompts
CREATE TABLE IF NOT EXISTS essay_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    prompt TEXT NOT NULL,
    min_words INTEGER,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_essay_item ON essay_records(item_id);

-- Course lessons
CREATE TABLE IF NOT EXISTS lesson_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_lesson_item ON lesson_records(item_id);

-- Dictionary senses
CREATE TABLE IF NOT EXISTS sense_records (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    definition TEXT NOT NULL,
    example TEXT,
    part_of_speech TEXT,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sense_item ON sense_records(item_id);

-- Durable resync requests drained by the background worker
CREATE TABLE IF NOT EXISTS sync_outbox (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL,
    category TEXT NOT NULL,
    reason TEXT NOT NULL DEFAULT 'upsert',
    enqueued_at TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    applied INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_outbox_applied ON sync_outbox(applied, enqueued_at);
CREATE INDEX IF NOT EXISTS idx_outbox_item ON sync_outbox(item_id);
"#;

/// Tables holding sub-record variants, in cascade-delete order
pub const SUB_RECORD_TABLES: &[&str] = &[
    "blank_records",
    "choice_records",
    "true_false_records",
    "matching_records",
    "sentence_records",
    "essay_records",
    "lesson_records",
    "sense_records",
];
