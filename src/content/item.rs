//! Content item aggregate and its type discriminators

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level content category, one per exercise family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Grammar,
    Listening,
    Reading,
    Speaking,
    Writing,
    Course,
    Dictionary,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Grammar => "grammar",
            Category::Listening => "listening",
            Category::Reading => "reading",
            Category::Speaking => "speaking",
            Category::Writing => "writing",
            Category::Course => "course",
            Category::Dictionary => "dictionary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grammar" => Some(Category::Grammar),
            "listening" => Some(Category::Listening),
            "reading" => Some(Category::Reading),
            "speaking" => Some(Category::Speaking),
            "writing" => Some(Category::Writing),
            "course" => Some(Category::Course),
            "dictionary" => Some(Category::Dictionary),
            _ => None,
        }
    }

    /// Prefix used for detail cache keys, e.g. `writing_question:<id>:<status>:<version>`
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            Category::Grammar => "grammar_question",
            Category::Listening => "listening_question",
            Category::Reading => "reading_question",
            Category::Speaking => "speaking_question",
            Category::Writing => "writing_question",
            Category::Course => "course",
            Category::Dictionary => "dictionary_entry",
        }
    }
}

/// Exercise subtype discriminator
///
/// Closed set: an unknown kind string coming out of the store is a hard
/// error at the assembly boundary, never a silently empty view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    FillInTheBlank,
    MultipleChoice,
    TrueFalse,
    Listening,
    Reading,
    Speaking,
    SentenceCompletion,
    Essay,
    Course,
    DictionaryEntry,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::FillInTheBlank => "fill_in_the_blank",
            ContentKind::MultipleChoice => "multiple_choice",
            ContentKind::TrueFalse => "true_false",
            ContentKind::Listening => "listening",
            ContentKind::Reading => "reading",
            ContentKind::Speaking => "speaking",
            ContentKind::SentenceCompletion => "sentence_completion",
            ContentKind::Essay => "essay",
            ContentKind::Course => "course",
            ContentKind::DictionaryEntry => "dictionary_entry",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fill_in_the_blank" => Some(ContentKind::FillInTheBlank),
            "multiple_choice" => Some(ContentKind::MultipleChoice),
            "true_false" => Some(ContentKind::TrueFalse),
            "listening" => Some(ContentKind::Listening),
            "reading" => Some(ContentKind::Reading),
            "speaking" => Some(ContentKind::Speaking),
            "sentence_completion" => Some(ContentKind::SentenceCompletion),
            "essay" => Some(ContentKind::Essay),
            "course" => Some(ContentKind::Course),
            "dictionary_entry" => Some(ContentKind::DictionaryEntry),
            _ => None,
        }
    }

    /// The category every kind belongs to
    pub fn category(&self) -> Category {
        match self {
            ContentKind::FillInTheBlank | ContentKind::MultipleChoice | ContentKind::TrueFalse => {
                Category::Grammar
            }
            ContentKind::Listening => Category::Listening,
            ContentKind::Reading => Category::Reading,
            ContentKind::Speaking => Category::Speaking,
            ContentKind::SentenceCompletion | ContentKind::Essay => Category::Writing,
            ContentKind::Course => Category::Course,
            ContentKind::DictionaryEntry => Category::Dictionary,
        }
    }
}

/// Parent aggregate for one exercise / course / dictionary entry
///
/// `version` starts at 1 and is bumped by exactly 1 on every successful
/// direct-field mutation. Sub-record mutations do not touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub version: i64,
    pub topic: Option<String>,
    pub instruction: Option<String>,
    pub time_limit_secs: Option<i64>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ContentItem {
    /// Create a fresh item at version 1
    pub fn new(id: String, kind: ContentKind, data: CreateItem) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id,
            kind,
            version: 1,
            topic: data.topic,
            instruction: data.instruction,
            time_limit_secs: data.time_limit_secs,
            image_url: data.image_url,
            audio_url: data.audio_url,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

/// Create item request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub topic: Option<String>,
    pub instruction: Option<String>,
    pub time_limit_secs: Option<i64>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
}
