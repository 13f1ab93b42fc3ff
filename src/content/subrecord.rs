//! Typed sub-records owned by a content item
//!
//! Each variant lives in its own table with a foreign key to the parent
//! item. Deleting the item deletes its sub-records.

use serde::{Deserialize, Serialize};

/// Fill-in-the-blank question with its accepted answer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlankRecord {
    pub id: String,
    pub item_id: String,
    pub question: String,
    pub answer: String,
    pub position: i64,
}

/// Multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRecord {
    pub id: String,
    pub item_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    pub position: i64,
}

/// True/false statement triplet
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseRecord {
    pub id: String,
    pub item_id: String,
    pub statement: String,
    pub is_true: bool,
    pub explanation: Option<String>,
    pub position: i64,
}

/// Matching pair (left column entry matched to a right column entry)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRecord {
    pub id: String,
    pub item_id: String,
    pub left_text: String,
    pub right_text: String,
    pub position: i64,
}

/// Sentence prompt (sentence completion, speaking prompts)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    pub id: String,
    pub item_id: String,
    pub prompt: String,
    pub reference_answer: Option<String>,
    pub position: i64,
}

/// Essay prompt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EssayRecord {
    pub id: String,
    pub item_id: String,
    pub prompt: String,
    pub min_words: Option<i64>,
    pub position: i64,
}

/// Course lesson section
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: String,
    pub item_id: String,
    pub title: String,
    pub body: Option<String>,
    pub position: i64,
}

/// Dictionary sense
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SenseRecord {
    pub id: String,
    pub item_id: String,
    pub definition: String,
    pub example: Option<String>,
    pub part_of_speech: Option<String>,
    pub position: i64,
}

/// Create sub-record request, tagged by variant
///
/// The variant must match what the parent item's kind expects; the
/// repository rejects mismatches before writing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateSubRecord {
    Blank {
        question: String,
        answer: String,
        #[serde(default)]
        position: i64,
    },
    Choice {
        question: String,
        options: Vec<String>,
        #[serde(rename = "correctIndex")]
        correct_index: i64,
        #[serde(default)]
        position: i64,
    },
    TrueFalse {
        statement: String,
        #[serde(rename = "isTrue")]
        is_true: bool,
        explanation: Option<String>,
        #[serde(default)]
        position: i64,
    },
    Matching {
        #[serde(rename = "leftText")]
        left_text: String,
        #[serde(rename = "rightText")]
        right_text: String,
        #[serde(default)]
        position: i64,
    },
    Sentence {
        prompt: String,
        #[serde(rename = "referenceAnswer")]
        reference_answer: Option<String>,
        #[serde(default)]
        position: i64,
    },
    Essay {
        prompt: String,
        #[serde(rename = "minWords")]
        min_words: Option<i64>,
        #[serde(default)]
        position: i64,
    },
    Lesson {
        title: String,
        body: Option<String>,
        #[serde(default)]
        position: i64,
    },
    Sense {
        definition: String,
        example: Option<String>,
        #[serde(rename = "partOfSpeech")]
        part_of_speech: Option<String>,
        #[serde(default)]
        position: i64,
    },
}
